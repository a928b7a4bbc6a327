/// Length of a public event slug, in hex characters (48 random bits).
pub const SLUG_LEN: usize = 12;

/// Generate a short random public token for guest URLs.
pub fn generate_slug() -> String {
    let mut slug = uuid::Uuid::new_v4().simple().to_string();
    slug.truncate(SLUG_LEN);
    slug
}

/// Cheap shape check so malformed slugs never reach the database.
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() == SLUG_LEN && slug.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

//! GROQ queries issued by the page builder

/// Every post's id and slug
pub const ALL_POST_PATHS: &str = r#"*[_type == "post"]{
  _id,
  slug {
    current
  }
}"#;

/// One post by slug, with the author reference expanded
pub const POST_BY_SLUG: &str = r#"*[_type == "post" && slug.current == $slug][0]{
  _id,
  _createdAt,
  title,
  author -> {
    name,
    image
  },
  description,
  mainImage,
  slug,
  body
}"#;

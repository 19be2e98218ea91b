use serde::{Deserialize, Serialize};

use super::error::DomainError;

const IMAGE_BASE_URL: &str = "https://picsum.photos/seed";

pub(crate) fn image_url_for(id: i64) -> String {
    format!("{IMAGE_BASE_URL}/{id}/800/600")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Reactions {
    pub(crate) likes: u32,
    pub(crate) dislikes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReactionKind {
    Like,
    Dislike,
}

impl Reactions {
    pub(crate) fn incremented(self, kind: ReactionKind) -> Self {
        match kind {
            ReactionKind::Like => Self {
                likes: self.likes.saturating_add(1),
                ..self
            },
            ReactionKind::Dislike => Self {
                dislikes: self.dislikes.saturating_add(1),
                ..self
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) body: String,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    #[serde(default)]
    pub(crate) user_id: i64,
    #[serde(default)]
    pub(crate) reactions: Reactions,
    #[serde(default)]
    pub(crate) views: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) image_url: Option<String>,
}

impl Post {
    /// Добавляет URL картинки, привязанный к id поста.
    pub(crate) fn annotated(self) -> Self {
        Self {
            image_url: Some(image_url_for(self.id)),
            ..self
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PostList {
    pub(crate) posts: Vec<Post>,
    pub(crate) total: u64,
    pub(crate) skip: u32,
    pub(crate) limit: u32,
}

impl PostList {
    pub(crate) fn annotated(self) -> Self {
        Self {
            posts: self.posts.into_iter().map(Post::annotated).collect(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) tags: Vec<String>,
    pub(crate) user_id: i64,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        validate_positive_i64("user_id", self.user_id)?;
        Ok(Self {
            title: normalize_title(&self.title)?,
            body: normalize_body(&self.body)?,
            tags: normalize_tags(self.tags),
            user_id: self.user_id,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) user_id: Option<i64>,
    pub(crate) reactions: Option<Reactions>,
    pub(crate) views: Option<u32>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(user_id) = self.user_id {
            validate_positive_i64("user_id", user_id)?;
        }
        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            body: self.body.as_deref().map(normalize_body).transpose()?,
            tags: self.tags.map(normalize_tags),
            ..self
        })
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_body(body: &str) -> Result<String, DomainError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(DomainError::Validation {
            field: "body",
            message: "must not be empty",
        });
    }
    Ok(body.to_string())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_post_request_validate_rejects_empty_title() {
        let req = CreatePostRequest {
            title: "   ".to_string(),
            body: "valid body".to_string(),
            tags: vec![],
            user_id: 1,
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn create_post_request_validate_rejects_non_positive_user() {
        let req = CreatePostRequest {
            title: "title".to_string(),
            body: "body".to_string(),
            tags: vec![],
            user_id: 0,
        };

        let err = req.validate().expect_err("user_id must be rejected");
        assert_validation_field(err, "user_id");
    }

    #[test]
    fn create_post_request_validate_normalizes_fields() {
        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            body: "  body  ".to_string(),
            tags: vec![" a ".to_string(), "".to_string()],
            user_id: 5,
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.body, "body");
        assert_eq!(validated.tags, vec!["a".to_string()]);
    }

    #[test]
    fn update_post_request_validates_only_present_fields() {
        let req = UpdatePostRequest {
            body: Some("   ".to_string()),
            ..UpdatePostRequest::default()
        };
        let err = req.validate().expect_err("blank body must be rejected");
        assert_validation_field(err, "body");

        let req = UpdatePostRequest {
            title: Some(" new ".to_string()),
            ..UpdatePostRequest::default()
        };
        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title.as_deref(), Some("new"));
        assert!(validated.body.is_none());
    }

    #[test]
    fn annotated_post_gets_seeded_image_url() {
        let post = Post {
            id: 42,
            title: "t".to_string(),
            body: "b".to_string(),
            tags: vec![],
            user_id: 1,
            reactions: Reactions::default(),
            views: 0,
            image_url: None,
        };

        assert_eq!(
            post.annotated().image_url.as_deref(),
            Some("https://picsum.photos/seed/42/800/600")
        );
    }

    #[test]
    fn upstream_create_response_decodes_without_counters() {
        let raw = r#"{ "id": 252, "title": "t", "body": "b", "userId": 5, "tags": ["x"] }"#;
        let post: Post = serde_json::from_str(raw).expect("must decode");
        assert_eq!(post.id, 252);
        assert_eq!(post.reactions, Reactions::default());
        assert_eq!(post.views, 0);
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}

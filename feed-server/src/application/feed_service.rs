use tracing::info;

use crate::data::post_upstream::{NewPost, Pagination, PostPatch, PostUpstream};
use crate::domain::error::DomainError;
use crate::domain::post::{
    CreatePostRequest, Post, PostList, ReactionKind, Reactions, UpdatePostRequest,
};

pub(crate) struct FeedService<U: PostUpstream> {
    upstream: U,
}

impl<U: PostUpstream> FeedService<U> {
    pub(crate) fn new(upstream: U) -> Self {
        Self { upstream }
    }

    pub(crate) async fn list_posts(&self, skip: u32, limit: u32) -> Result<PostList, DomainError> {
        let pagination = Pagination { skip, limit };
        Ok(self.upstream.list_posts(pagination).await?.annotated())
    }

    pub(crate) async fn search_posts(&self, query: &str) -> Result<PostList, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::Validation {
                field: "q",
                message: "must not be empty",
            });
        }
        Ok(self.upstream.search_posts(query).await?.annotated())
    }

    pub(crate) async fn posts_by_user(&self, user_id: i64) -> Result<PostList, DomainError> {
        Ok(self.upstream.posts_by_user(user_id).await?.annotated())
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        Ok(self.upstream.get_post(id).await?.annotated())
    }

    pub(crate) async fn create_post(&self, req: CreatePostRequest) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            body: req.body,
            tags: req.tags,
            user_id: req.user_id,
        };
        let created = self.upstream.create_post(new_post).await?;
        info!(id = created.id, "post created upstream");

        // апстрим не возвращает счётчики для нового поста
        Ok(Post {
            reactions: Reactions::default(),
            views: 0,
            ..created
        }
        .annotated())
    }

    pub(crate) async fn update_post(
        &self,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let patch = PostPatch {
            title: req.title,
            body: req.body,
            tags: req.tags,
            user_id: req.user_id,
            reactions: req.reactions,
            views: req.views,
        };
        Ok(self.upstream.update_post(id, patch).await?.annotated())
    }

    pub(crate) async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        self.upstream.delete_post(id).await?;
        info!(id, "post deleted upstream");
        Ok(())
    }

    /// Увеличивает счётчик реакции на 1.
    ///
    /// Апстрим не умеет инкремент, поэтому это чтение и запись целого значения:
    /// повторный запрос увеличит счётчик ещё раз.
    pub(crate) async fn react(&self, id: i64, kind: ReactionKind) -> Result<Post, DomainError> {
        let current = self.upstream.get_post(id).await?;
        let reactions = current.reactions.incremented(kind);

        let patch = PostPatch {
            reactions: Some(reactions),
            ..PostPatch::default()
        };
        let updated = self.upstream.update_post(id, patch).await?;

        Ok(Post {
            reactions,
            ..updated
        }
        .annotated())
    }
}

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::error::{AppError, AppResult};
use crate::models::{Comment, Follow, GraphId, Like, Post, UserProfile};
use crate::store::GraphStore;

/// SQLite implementation of the graph store
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(url: &str) -> AppResult<Self> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to SQLite: {}", e)))?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// In-memory store for tests. Pinned to one connection: each SQLite
    /// in-memory connection is its own database.
    pub async fn new_in_memory() -> AppResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to in-memory SQLite: {}", e))
            })?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create graph tables and indexes
    pub async fn initialize(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY,
                author_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                likes_count INTEGER NOT NULL DEFAULT 0,
                is_private INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                edited_at INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create posts table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                uid INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                username TEXT NOT NULL,
                bio TEXT NOT NULL DEFAULT '',
                avatar TEXT NOT NULL DEFAULT '',
                followers_count INTEGER NOT NULL DEFAULT 0,
                following_count INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create users table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS likes (
                id INTEGER PRIMARY KEY,
                post_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create likes table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS follows (
                id INTEGER PRIMARY KEY,
                follower_id INTEGER NOT NULL,
                following_id INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create follows table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY,
                post_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create comments table: {}", e)))?;

        // No unique index on the (post_id, user_id) / (follower_id, following_id)
        // pairs: the at-most-one invariant is the toggle protocol's job.
        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)",
            "CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)",
            "CREATE INDEX IF NOT EXISTS idx_likes_post ON likes(post_id)",
            "CREATE INDEX IF NOT EXISTS idx_likes_pair ON likes(post_id, user_id)",
            "CREATE INDEX IF NOT EXISTS idx_follows_pair ON follows(follower_id, following_id)",
            "CREATE INDEX IF NOT EXISTS idx_follows_target ON follows(following_id)",
            "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id)",
        ];
        for stmt in indexes {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to create index: {}", e)))?;
        }

        Ok(())
    }
}

fn post_from_row(row: &SqliteRow) -> Post {
    let tags_json: String = row.get("tags");
    Post {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        content: row.get("content"),
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        likes_count: row.get("likes_count"),
        is_private: row.get::<i64, _>("is_private") != 0,
        created_at: row.get("created_at"),
        edited_at: row.get("edited_at"),
    }
}

fn profile_from_row(row: &SqliteRow) -> UserProfile {
    UserProfile {
        uid: row.get("uid"),
        name: row.get("name"),
        username: row.get("username"),
        bio: row.get("bio"),
        avatar: row.get("avatar"),
        followers_count: row.get("followers_count"),
        following_count: row.get("following_count"),
        created_at: row.get("created_at"),
    }
}

fn like_from_row(row: &SqliteRow) -> Like {
    Like {
        id: row.get("id"),
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}

fn follow_from_row(row: &SqliteRow) -> Follow {
    Follow {
        id: row.get("id"),
        follower_id: row.get("follower_id"),
        following_id: row.get("following_id"),
        created_at: row.get("created_at"),
    }
}

fn comment_from_row(row: &SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl GraphStore for SqliteStore {
    async fn get_post(&self, id: GraphId) -> AppResult<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| post_from_row(&r)))
    }

    async fn insert_post(&self, post: &Post) -> AppResult<()> {
        let tags_json = serde_json::to_string(&post.tags)
            .map_err(|e| AppError::Internal(format!("Failed to serialize tags: {}", e)))?;
        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, title, content, tags, likes_count, is_private, created_at, edited_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(tags_json)
        .bind(post.likes_count)
        .bind(post.is_private as i64)
        .bind(post.created_at)
        .bind(post.edited_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_post_content(
        &self,
        id: GraphId,
        title: &str,
        content: &str,
        edited_at: i64,
    ) -> AppResult<()> {
        sqlx::query("UPDATE posts SET title = ?, content = ?, edited_at = ? WHERE id = ?")
            .bind(title)
            .bind(content)
            .bind(edited_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_post(&self, id: GraphId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn posts_by_author(&self, author_id: GraphId) -> AppResult<Vec<Post>> {
        let rows = sqlx::query("SELECT * FROM posts WHERE author_id = ?")
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn apply_likes_delta(&self, post_id: GraphId, delta: i64) -> AppResult<()> {
        // Single-statement delta; never read-modify-write the cached value
        sqlx::query("UPDATE posts SET likes_count = likes_count + ? WHERE id = ?")
            .bind(delta)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_likes_count(&self, post_id: GraphId, count: i64) -> AppResult<()> {
        sqlx::query("UPDATE posts SET likes_count = ? WHERE id = ?")
            .bind(count)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_profile(&self, uid: GraphId) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query("SELECT * FROM users WHERE uid = ?")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| profile_from_row(&r)))
    }

    async fn insert_profile(&self, profile: &UserProfile) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (uid, name, username, bio, avatar, followers_count, following_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(profile.uid)
        .bind(&profile.name)
        .bind(&profile.username)
        .bind(&profile.bio)
        .bind(&profile.avatar)
        .bind(profile.followers_count)
        .bind(profile.following_count)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_profile_bio(&self, uid: GraphId, bio: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET bio = ? WHERE uid = ?")
            .bind(bio)
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn apply_followers_delta(&self, uid: GraphId, delta: i64) -> AppResult<()> {
        sqlx::query("UPDATE users SET followers_count = followers_count + ? WHERE uid = ?")
            .bind(delta)
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn apply_following_delta(&self, uid: GraphId, delta: i64) -> AppResult<()> {
        sqlx::query("UPDATE users SET following_count = following_count + ? WHERE uid = ?")
            .bind(delta)
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_follow_counts(
        &self,
        uid: GraphId,
        followers: i64,
        following: i64,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET followers_count = ?, following_count = ? WHERE uid = ?")
            .bind(followers)
            .bind(following)
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn profiles_by_username_range(
        &self,
        lower: &str,
        upper: &str,
    ) -> AppResult<Vec<UserProfile>> {
        // BINARY collation compares UTF-8 bytewise, which is code-point order
        let rows =
            sqlx::query("SELECT * FROM users WHERE username >= ? AND username < ? ORDER BY username")
                .bind(lower)
                .bind(upper)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.iter().map(profile_from_row).collect())
    }

    async fn likes_for_post(&self, post_id: GraphId) -> AppResult<Vec<Like>> {
        let rows = sqlx::query("SELECT * FROM likes WHERE post_id = ?")
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(like_from_row).collect())
    }

    async fn likes_by_pair(&self, post_id: GraphId, user_id: GraphId) -> AppResult<Vec<Like>> {
        let rows = sqlx::query("SELECT * FROM likes WHERE post_id = ? AND user_id = ?")
            .bind(post_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(like_from_row).collect())
    }

    async fn count_likes(&self, post_id: GraphId) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM likes WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    async fn insert_like(&self, like: &Like) -> AppResult<()> {
        sqlx::query("INSERT INTO likes (id, post_id, user_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(like.id)
            .bind(like.post_id)
            .bind(like.user_id)
            .bind(like.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_like(&self, id: GraphId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn follows_by_pair(
        &self,
        follower_id: GraphId,
        following_id: GraphId,
    ) -> AppResult<Vec<Follow>> {
        let rows = sqlx::query("SELECT * FROM follows WHERE follower_id = ? AND following_id = ?")
            .bind(follower_id)
            .bind(following_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(follow_from_row).collect())
    }

    async fn count_followers(&self, uid: GraphId) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM follows WHERE following_id = ?")
            .bind(uid)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    async fn count_following(&self, uid: GraphId) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM follows WHERE follower_id = ?")
            .bind(uid)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    async fn insert_follow(&self, follow: &Follow) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO follows (id, follower_id, following_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(follow.id)
        .bind(follow.follower_id)
        .bind(follow.following_id)
        .bind(follow.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_follow(&self, id: GraphId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn comments_for_post(&self, post_id: GraphId) -> AppResult<Vec<Comment>> {
        let rows = sqlx::query("SELECT * FROM comments WHERE post_id = ? ORDER BY created_at")
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn insert_comment(&self, comment: &Comment) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO comments (id, post_id, user_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_comment(&self, id: GraphId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

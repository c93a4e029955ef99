//! Sample models shared by the unit tests.

use serde_json::{Map, Value, json};

use crate::error::DefinitionError;
use crate::model::{Associated, Model, attributes_of};
use crate::registry::SchemaRegistry;

#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct Author {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(id: u64, name: &str, email: &str) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Model for Author {
    fn read_attribute_for_serialization(&self, name: &str) -> Value {
        match name {
            "id" => json!(self.id),
            "name" => json!(self.name),
            "email" => json!(self.email),
            _ => Value::Null,
        }
    }

    fn attributes(&self) -> Map<String, Value> {
        attributes_of(self)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Like {
    pub id: u64,
}

impl Model for Like {
    fn read_attribute_for_serialization(&self, name: &str) -> Value {
        match name {
            "id" => json!(self.id),
            _ => Value::Null,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Comment {
    pub id: u64,
    pub body: String,
    pub author: Option<Author>,
    pub likes: Vec<Like>,
}

impl Comment {
    pub fn new(id: u64, body: &str) -> Self {
        Self {
            id,
            body: body.into(),
            author: None,
            likes: Vec::new(),
        }
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    pub fn with_likes(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.likes = ids.into_iter().map(|id| Like { id }).collect();
        self
    }
}

impl Model for Comment {
    fn read_attribute_for_serialization(&self, name: &str) -> Value {
        match name {
            "id" => json!(self.id),
            "body" => json!(self.body),
            _ => Value::Null,
        }
    }

    fn read_association(&self, name: &str) -> Option<Associated<'_>> {
        match name {
            "author" => Associated::optional(self.author.as_ref()),
            // likes are not loaded unless there are any
            "likes" if !self.likes.is_empty() => Some(Associated::many(&self.likes)),
            _ => None,
        }
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.id));
        map.insert("body".into(), json!(self.body));
        map
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub id: u64,
    pub title: String,
    pub comments: Vec<Comment>,
    pub author: Option<Author>,
}

impl Post {
    pub fn new(id: u64, title: &str) -> Self {
        Self {
            id,
            title: title.into(),
            comments: Vec::new(),
            author: None,
        }
    }

    pub fn with_comments(mut self, comments: impl IntoIterator<Item = Comment>) -> Self {
        self.comments = comments.into_iter().collect();
        self
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }
}

impl Model for Post {
    fn read_attribute_for_serialization(&self, name: &str) -> Value {
        match name {
            "id" => json!(self.id),
            "title" => json!(self.title),
            _ => Value::Null,
        }
    }

    fn read_association(&self, name: &str) -> Option<Associated<'_>> {
        match name {
            "comments" => Some(Associated::many(&self.comments)),
            "author" => Associated::optional(self.author.as_ref()),
            _ => None,
        }
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.id));
        map.insert("title".into(), json!(self.title));
        map
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub id: Option<u64>,
    pub name: String,
    pub email: Option<String>,
    pub ssn: Option<String>,
    pub admin: bool,
}

impl User {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            email: None,
            ssn: None,
            admin: false,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_ssn(mut self, ssn: &str) -> Self {
        self.ssn = Some(ssn.into());
        self
    }

    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }
}

impl Model for User {
    fn read_attribute_for_serialization(&self, name: &str) -> Value {
        match name {
            "id" => json!(self.id),
            "name" => json!(self.name),
            "email" => json!(self.email),
            "ssn" => json!(self.ssn),
            _ => Value::Null,
        }
    }
}

/// A user subtype.
#[derive(Debug, Clone)]
pub(crate) struct Admin {
    pub user: User,
    pub level: u8,
}

impl Admin {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            user: User::new(id, name).admin(),
            level: 1,
        }
    }
}

impl AsRef<User> for Admin {
    fn as_ref(&self) -> &User {
        &self.user
    }
}

impl Model for Admin {
    fn read_attribute_for_serialization(&self, name: &str) -> Value {
        match name {
            "level" => json!(self.level),
            _ => self.user.read_attribute_for_serialization(name),
        }
    }
}

/// Schemas of the blog models.
///
/// - `post`: root, `id`, `title`, has many `comments`, belongs to `author`.
/// - `comment`: `id`, `body`, belongs to `author`, has many `likes`.
/// - `author` / `user`: `id`, `name`, `email` in group `private`.
/// - `like`: `id`.
pub(crate) fn blog_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    define_blog(&mut registry).unwrap();
    registry
}

fn define_blog(registry: &mut SchemaRegistry) -> Result<(), DefinitionError> {
    registry.define::<Post>(|s| {
        s.root(true);
        s.attributes(["id", "title"]);
        s.has_many("comments");
        s.belongs_to("author");
    })?;
    registry.define::<Comment>(|s| {
        s.attributes(["id", "body"]);
        s.belongs_to("author");
        s.has_many("likes");
    })?;
    registry.define::<Author>(|s| {
        s.attributes(["id", "name"]);
        s.group("private", |s| {
            s.attribute("email");
        });
    })?;
    registry.define::<User>(|s| {
        s.attributes(["id", "name"]);
        s.group("private", |s| {
            s.attribute("email");
        });
    })?;
    registry.define::<Like>(|s| {
        s.attribute("id");
    })?;
    Ok(())
}

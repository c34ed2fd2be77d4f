//! Post types and data structures.
//!
//! Field names on the wire follow the mobile client that submits posts, which
//! is why the serde renames are not uniformly cased.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A stored post document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Caller-chosen identifier, primary key of the document.
    #[serde(rename = "postID")]
    pub post_id: String,
    /// Owner username.
    pub username: String,
    /// Caption text.
    pub caption: String,
    /// Media reference, empty when the post has no media.
    #[serde(rename = "mediaURL")]
    pub media_url: String,
    /// Free-form media tag such as `image` or `video`.
    #[serde(rename = "mediaType")]
    pub media_type: String,
    /// Hashtags as submitted.
    pub hashtags: String,
    /// Location.
    pub location: String,
    /// Tagged users as submitted.
    pub tagged_users: String,
    /// Client-side timestamp, stored verbatim.
    #[serde(rename = "SystemDateandTime")]
    pub system_date_time: String,
    /// Sponsorship flag as a string.
    #[serde(rename = "isSponsered")]
    pub is_sponsored: String,
    /// Platform name.
    #[serde(rename = "platform_Name")]
    pub platform_name: String,
}

impl Post {
    /// Build a document from a submission and its media reference.
    #[must_use]
    pub fn from_new(new_post: NewPost, media_url: String) -> Self {
        Self {
            post_id: new_post.post_id,
            username: new_post.username,
            caption: new_post.caption,
            media_url,
            media_type: new_post.media_type,
            hashtags: new_post.hashtags,
            location: new_post.location,
            tagged_users: new_post.tagged_users,
            system_date_time: new_post.system_date_time,
            is_sponsored: new_post.is_sponsored,
            platform_name: new_post.platform_name,
        }
    }

    /// Whether the post references a media file.
    #[must_use]
    pub fn has_media(&self) -> bool {
        !self.media_url.is_empty()
    }
}

/// A post submission, every field except the media reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    /// Owner username.
    pub username: String,
    /// Caller-chosen identifier.
    #[serde(rename = "postID")]
    pub post_id: String,
    /// Caption text.
    pub caption: String,
    /// Free-form media tag.
    #[serde(rename = "mediaType")]
    pub media_type: String,
    /// Hashtags.
    pub hashtags: String,
    /// Location.
    pub location: String,
    /// Tagged users.
    pub tagged_users: String,
    /// Client-side timestamp.
    pub system_date_time: String,
    /// Sponsorship flag.
    #[serde(rename = "isSponsered")]
    pub is_sponsored: String,
    /// Platform name.
    #[serde(rename = "platform_Name")]
    pub platform_name: String,
}

impl NewPost {
    /// Wire names of required fields that were submitted empty.
    #[must_use]
    pub fn empty_fields(&self) -> Vec<&'static str> {
        [
            ("username", &self.username),
            ("postID", &self.post_id),
            ("caption", &self.caption),
            ("mediaType", &self.media_type),
            ("hashtags", &self.hashtags),
            ("location", &self.location),
            ("tagged_users", &self.tagged_users),
            ("system_date_time", &self.system_date_time),
            ("isSponsered", &self.is_sponsored),
            ("platform_Name", &self.platform_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// An uploaded media file.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// File name as sent by the client, used for its extension.
    pub filename: String,
    /// File body.
    pub content: Bytes,
}

impl MediaUpload {
    /// Create a media upload.
    #[must_use]
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Partial update of a post's editable fields.
///
/// `None` means the field was not sent. A field sent as an empty string is
/// treated the same way, so a patch can never blank out a stored value.
/// Identifier, owner and media reference are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostPatch {
    /// New caption.
    pub caption: Option<String>,
    /// New media tag.
    #[serde(rename = "mediaType")]
    pub media_type: Option<String>,
    /// New hashtags.
    pub hashtags: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New tagged users.
    pub tagged_users: Option<String>,
    /// New client-side timestamp.
    #[serde(alias = "SystemDateandTime")]
    pub system_date_time: Option<String>,
    /// New sponsorship flag.
    #[serde(rename = "isSponsered")]
    pub is_sponsored: Option<String>,
    /// New platform name.
    #[serde(rename = "platform_Name")]
    pub platform_name: Option<String>,
}

impl PostPatch {
    /// Overwrite the fields of `post` that this patch provides.
    pub fn apply_to(&self, post: &mut Post) {
        overwrite(&mut post.caption, self.caption.as_deref());
        overwrite(&mut post.media_type, self.media_type.as_deref());
        overwrite(&mut post.hashtags, self.hashtags.as_deref());
        overwrite(&mut post.location, self.location.as_deref());
        overwrite(&mut post.tagged_users, self.tagged_users.as_deref());
        overwrite(&mut post.system_date_time, self.system_date_time.as_deref());
        overwrite(&mut post.is_sponsored, self.is_sponsored.as_deref());
        overwrite(&mut post.platform_name, self.platform_name.as_deref());
    }

    /// Whether applying the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.caption,
            &self.media_type,
            &self.hashtags,
            &self.location,
            &self.tagged_users,
            &self.system_date_time,
            &self.is_sponsored,
            &self.platform_name,
        ]
        .iter()
        .all(|value| value.as_deref().is_none_or(str::is_empty))
    }
}

fn overwrite(target: &mut String, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        value.clone_into(target);
    }
}

/// Confirmation returned by a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    /// Identifier of the affected post.
    #[serde(skip)]
    pub post_id: String,
    /// Human-readable message.
    pub message: String,
}

impl Confirmation {
    /// Post created or overwritten.
    #[must_use]
    pub fn created(post_id: &str, username: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            message: format!("Post {post_id} by {username} added successfully!"),
        }
    }

    /// Post patched.
    #[must_use]
    pub fn updated(post_id: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            message: format!("Post {post_id} updated successfully!"),
        }
    }

    /// Post removed.
    #[must_use]
    pub fn deleted(post_id: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            message: format!("Post {post_id} deleted successfully!"),
        }
    }
}

//! Changeset record model.
//!
//! A [`Changeset`] is built once from the raw attributes of a `<changeset>`
//! element. Every field is coerced and validated at construction, so an
//! existing `Changeset` is always storage-ready and never changes afterwards.
//!
//! Two serialization views exist:
//! - [`Changeset::to_tsv_row`]: the bulk-load transfer format (hot path)
//! - [`Changeset::to_insert_statement`]: a literal single-row `INSERT`, for
//!   recovery and debugging only

mod columns;
mod fields;
mod render;

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::config::{DEFAULT_BOUND, UNKNOWN_UID};
use crate::error_handling::MalformedRecordError;

pub use columns::{quoted_column_list, Column, ColumnKind};
pub(crate) use render::unescape_copy_text;

/// Attribute name to unescaped attribute value, as read from one XML element.
pub type RawAttributes = HashMap<String, String>;

/// One OSM changeset.
///
/// # Spatial bounds
///
/// Changesets without edits carry no bounding box. Absent bounds are stored as
/// `0.0`, which cannot be told apart from a genuine zero coordinate. Consumers
/// that care should check `num_changes` before trusting the bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Changeset {
    id: i64,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    open: bool,
    user: Option<String>,
    uid: i64,
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
    comments_count: u32,
    num_changes: u32,
}

impl Changeset {
    /// Builds a changeset from raw element attributes.
    ///
    /// Required: `id`, `created_at`, `open`, `comments_count`, `num_changes`.
    /// `uid` defaults to `-1` and the four bounds default to `0.0` when absent.
    /// A present `uid` must not be negative, so `-1` always means unknown.
    /// `open` is true only for the literal text `"true"`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecordError`] when a required attribute is missing,
    /// any present attribute fails to coerce, `id` is not positive, or
    /// `closed_at` precedes `created_at`.
    pub fn from_attributes(attrs: &RawAttributes) -> Result<Self, MalformedRecordError> {
        let raw_id = fields::required(attrs, Column::Id)?;
        let id: i64 = fields::parse_number(Column::Id, raw_id)?;
        if id <= 0 {
            return Err(fields::invalid(
                Column::Id,
                raw_id,
                "must be a positive integer".to_string(),
            ));
        }

        let created_at =
            fields::parse_timestamp(Column::CreatedAt, fields::required(attrs, Column::CreatedAt)?)?;
        let closed_at = fields::optional(attrs, Column::ClosedAt)
            .map(|raw| fields::parse_timestamp(Column::ClosedAt, raw))
            .transpose()?;
        if let Some(closed_at) = closed_at {
            if closed_at < created_at {
                return Err(MalformedRecordError::ClosedBeforeCreated {
                    id,
                    created_at,
                    closed_at,
                });
            }
        }

        let open = fields::required(attrs, Column::Open)? == "true";
        let user = fields::optional(attrs, Column::User).map(str::to_string);
        let uid = fields::optional(attrs, Column::Uid)
            .map(|raw| fields::parse_non_negative(Column::Uid, raw))
            .transpose()?
            .unwrap_or(UNKNOWN_UID);

        let bound = |column: Column| -> Result<f64, MalformedRecordError> {
            fields::optional(attrs, column)
                .map(|raw| fields::parse_coordinate(column, raw))
                .transpose()
                .map(|value| value.unwrap_or(DEFAULT_BOUND))
        };
        let min_lat = bound(Column::MinLat)?;
        let max_lat = bound(Column::MaxLat)?;
        let min_lon = bound(Column::MinLon)?;
        let max_lon = bound(Column::MaxLon)?;

        let comments_count = fields::parse_number(
            Column::CommentsCount,
            fields::required(attrs, Column::CommentsCount)?,
        )?;
        let num_changes = fields::parse_number(
            Column::NumChanges,
            fields::required(attrs, Column::NumChanges)?,
        )?;

        Ok(Self {
            id,
            created_at,
            closed_at,
            open,
            user,
            uid,
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            comments_count,
            num_changes,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// `None` while the changeset is still open.
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn open(&self) -> bool {
        self.open
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// `-1` when the dump does not name the user.
    pub fn uid(&self) -> i64 {
        self.uid
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    pub fn comments_count(&self) -> u32 {
        self.comments_count
    }

    pub fn num_changes(&self) -> u32 {
        self.num_changes
    }
}

impl fmt::Display for Changeset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OSM Changeset {}", self.id)
    }
}

//! Department direction that problems are tagged with.
//!
//! Directions are identified by a unique code. Known codes come
//! with a predefined human-readable label, which is used as a display
//! name whenever a direction is saved without one.

use std::str::FromStr;

use sea_orm::{entity::prelude::*, ActiveValue};
use serde::Serialize;

/// Longest code a direction may have.
pub const CODE_MAX_LENGTH: u64 = 20;

/// Known direction codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Code {
    OperatingSystem,
    Zup,
    Pu,
    Bu,
    Telephony,
    VideoPks,
    VideoPc,
}

impl Code {
    /// Every known direction code, in the order they are seeded.
    pub const ALL: [Code; 7] = [
        Code::OperatingSystem,
        Code::Zup,
        Code::Pu,
        Code::Bu,
        Code::Telephony,
        Code::VideoPks,
        Code::VideoPc,
    ];

    /// Code value stored inside of a database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::OperatingSystem => "OS",
            Code::Zup => "ZUP",
            Code::Pu => "PU",
            Code::Bu => "BU",
            Code::Telephony => "TEL",
            Code::VideoPks => "VIDEO_PKS",
            Code::VideoPc => "VIDEO_PC",
        }
    }

    /// Default display name.
    pub fn label(&self) -> &'static str {
        match self {
            Code::OperatingSystem => "Операционная система",
            Code::Zup => "1с ЗиУП",
            Code::Pu => "1с ПУ",
            Code::Bu => "1с БУ",
            Code::Telephony => "Телефония",
            Code::VideoPks => "Видеонаблюдение на ПКС",
            Code::VideoPc => "Видеонаблюдение общие проблемы с ПК",
        }
    }
}

/// Provided string is not a known direction code.
#[derive(Debug, PartialEq, Eq)]
pub struct UnknownCode;

impl FromStr for Code {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Code::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or(UnknownCode)
    }
}

/// Direction model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "directions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub display_name: String,
}

/// Direction model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::problem::Entity")]
    Problems,
}

impl Related<super::problem::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Problems.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Fill an empty display name from the known code labels.
    ///
    /// Only applies to [`ActiveModelTrait`] save methods, bulk inserts
    /// are not affected.
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let missing_display_name = match &self.display_name {
            ActiveValue::Set(name) | ActiveValue::Unchanged(name) => name.is_empty(),
            ActiveValue::NotSet => insert,
        };

        if missing_display_name {
            let code = match &self.code {
                ActiveValue::Set(code) | ActiveValue::Unchanged(code) => code.parse::<Code>().ok(),
                ActiveValue::NotSet => None,
            };

            if let Some(code) = code {
                self.display_name = ActiveValue::Set(code.label().to_string());
            } else if insert {
                self.display_name = ActiveValue::Set(String::new());
            }
        }

        Ok(self)
    }
}

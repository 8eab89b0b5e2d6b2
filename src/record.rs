//! The résumé record exactly as it arrives from the outside world.
//!
//! Every field is optional and every field is parsed leniently: a value of the wrong JSON type
//! is treated as absent instead of failing the whole record. Alternate key spellings are kept
//! as separate fields here and reconciled once, in [`crate::resume::Resume::from_record`].

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ContextError, ErrorKind};

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub personal_info: Option<PersonalInfoRecord>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub work_experience: Option<Vec<WorkExperienceRecord>>,
    /// Takes precedence over `work_experience` when both are present.
    #[serde(default, deserialize_with = "lenient_list")]
    pub work_experiences: Option<Vec<WorkExperienceRecord>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub education: Option<Vec<EducationRecord>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Option<Vec<SkillRecord>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub languages: Option<Vec<LanguageRecord>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub references: Option<Vec<ReferenceRecord>>,
    #[serde(default, deserialize_with = "lenient_hobbies")]
    pub hobbies: Option<Hobbies>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub certifications: Option<Vec<CertificationRecord>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub projects: Option<Vec<ProjectRecord>>,
}

impl ResumeRecord {
    /// Parses a record from JSON text. The only failure is text which is not a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self, ContextError> {
        let value: Value = serde_json::from_str(json).map_err(|error| {
            ContextError::with_error(ErrorKind::InvalidInput, "Unable to parse the record", &error)
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ContextError> {
        if !value.is_object() {
            return Err(ContextError::with_context(
                ErrorKind::InvalidInput,
                "The record must be a JSON object",
            ));
        }
        serde_json::from_value(value).map_err(|error| {
            ContextError::with_error(ErrorKind::InvalidInput, "Unable to parse the record", &error)
        })
    }

    pub fn from_path(record_path: &PathBuf) -> Result<Self, ContextError> {
        let record_content = std::fs::read_to_string(record_path).map_err(|error| {
            ContextError::with_error(
                ErrorKind::Io,
                format!("Unable to read the record {:?}", record_path),
                &error,
            )
        })?;
        Self::from_json_str(&record_content)
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub professional_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub linkedin: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employer: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_current: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub current: Option<bool>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub achievements: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EducationRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub school: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub field_of_study: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub gpa: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

/// A skill is either a bare name or a name with an optional level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SkillRecord {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Detailed {
        #[serde(default, deserialize_with = "lenient_text")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient_text")]
        level: Option<String>,
    },
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub proficiency: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub level: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
}

/// Hobbies occur both as one free-text string and as a list of strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Hobbies {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CertificationRecord {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Detailed {
        #[serde(default, deserialize_with = "lenient_text")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient_text")]
        issuer: Option<String>,
        #[serde(default, deserialize_with = "lenient_text")]
        date: Option<String>,
    },
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub technologies: Option<Vec<String>>,
}

/// Deserializes any value into `T`, treating a mismatching value as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserializes a list element by element, dropping the elements which do not fit `T`.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(elements) => Some(
            elements
                .into_iter()
                .filter_map(|element| serde_json::from_value(element).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Accepts strings, and numbers or booleans rendered as text (phone numbers and GPAs are often
/// stored as numbers).
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(value))
}

fn lenient_text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(elements) => Some(elements.into_iter().filter_map(value_to_text).collect()),
        _ => None,
    })
}

fn lenient_hobbies<'de, D>(deserializer: D) -> Result<Option<Hobbies>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(hobbies) => Some(Hobbies::Single(hobbies)),
        Value::Array(elements) => Some(Hobbies::Many(
            elements.into_iter().filter_map(value_to_text).collect(),
        )),
        _ => None,
    })
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

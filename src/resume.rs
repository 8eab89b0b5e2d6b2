//! The canonical résumé consumed by the compositor.
//!
//! [`Resume::from_record`] is the only place where alternate key spellings, string-or-list
//! fields and missing values are dealt with. Past that point every field is present: absent
//! text is an empty string and absent lists are empty vectors, and entries which carry no
//! identifying text have been dropped.

use serde::{Deserialize, Serialize};

use crate::record::{
    CertificationRecord, EducationRecord, Hobbies, LanguageRecord, PersonalInfoRecord,
    ProjectRecord, ReferenceRecord, ResumeRecord, SkillRecord, WorkExperienceRecord,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub languages: Vec<Language>,
    pub references: Vec<Reference>,
    pub hobbies: Vec<String>,
    pub certifications: Vec<Certification>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
}

impl PersonalInfo {
    /// First and last name separated by a space, without dangling whitespace.
    pub fn full_name(&self) -> String {
        join_non_empty([self.first_name.as_str(), self.last_name.as_str()], " ")
    }

    /// The contact details in display order, absent ones omitted.
    pub fn contact_details(&self) -> Vec<&str> {
        [
            self.email.as_str(),
            self.phone.as_str(),
            self.location.as_str(),
            self.website.as_str(),
            self.linkedin.as_str(),
        ]
        .into_iter()
        .filter(|detail| !detail.is_empty())
        .collect()
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub is_current: bool,
    pub description: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub field_of_study: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub gpa: String,
    pub description: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub name: String,
    pub level: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Language {
    pub name: String,
    pub proficiency: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    pub name: String,
    pub position: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub url: String,
    pub technologies: Vec<String>,
}

impl Resume {
    /// Builds the canonical résumé out of a raw record. This never fails.
    pub fn from_record(record: &ResumeRecord) -> Resume {
        let personal_info_record = record.personal_info.clone().unwrap_or_default();

        // `workExperiences` wins over `workExperience` whenever it is present
        let work_experience = record
            .work_experiences
            .as_ref()
            .or(record.work_experience.as_ref())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let resume = Resume {
            personal_info: normalize_personal_info(&personal_info_record),
            summary: first_non_empty([
                record.summary.as_deref(),
                personal_info_record.summary.as_deref(),
            ]),
            work_experience: work_experience
                .iter()
                .map(normalize_work_experience)
                .filter(|entry| !entry.job_title.is_empty() || !entry.company.is_empty())
                .collect(),
            education: list(&record.education)
                .iter()
                .map(normalize_education)
                .filter(|entry| !entry.degree.is_empty() || !entry.institution.is_empty())
                .collect(),
            skills: list(&record.skills)
                .iter()
                .map(normalize_skill)
                .filter(|skill| !skill.name.is_empty())
                .collect(),
            languages: list(&record.languages)
                .iter()
                .map(normalize_language)
                .filter(|language| !language.name.is_empty())
                .collect(),
            references: list(&record.references)
                .iter()
                .map(normalize_reference)
                .filter(|reference| !reference.name.is_empty())
                .collect(),
            hobbies: normalize_hobbies(record.hobbies.as_ref()),
            certifications: list(&record.certifications)
                .iter()
                .map(normalize_certification)
                .filter(|certification| !certification.name.is_empty())
                .collect(),
            projects: list(&record.projects)
                .iter()
                .map(normalize_project)
                .filter(|project| !project.name.is_empty())
                .collect(),
        };
        log::debug!(
            "Normalized record: {} work entries, {} education entries, {} skills, {} references",
            resume.work_experience.len(),
            resume.education.len(),
            resume.skills.len(),
            resume.references.len()
        );

        resume
    }
}

impl From<&ResumeRecord> for Resume {
    fn from(record: &ResumeRecord) -> Self {
        Resume::from_record(record)
    }
}

fn list<T>(entries: &Option<Vec<T>>) -> &[T] {
    entries.as_deref().unwrap_or_default()
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Picks the first candidate which is not blank, trimmed.
fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn join_non_empty<'a>(parts: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn clean_list(entries: &Option<Vec<String>>) -> Vec<String> {
    list(entries)
        .iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn normalize_personal_info(record: &PersonalInfoRecord) -> PersonalInfo {
    let composed_location = join_non_empty(
        [
            record.city.as_deref().unwrap_or_default(),
            record.region.as_deref().unwrap_or_default(),
            record.country.as_deref().unwrap_or_default(),
        ],
        ", ",
    );

    PersonalInfo {
        first_name: text(&record.first_name),
        last_name: text(&record.last_name),
        title: first_non_empty([
            record.professional_title.as_deref(),
            record.job_title.as_deref(),
        ]),
        email: text(&record.email),
        phone: text(&record.phone),
        location: first_non_empty([
            record.location.as_deref(),
            record.address.as_deref(),
            Some(composed_location.as_str()),
        ]),
        website: text(&record.website),
        linkedin: text(&record.linkedin),
    }
}

fn normalize_work_experience(record: &WorkExperienceRecord) -> WorkExperience {
    WorkExperience {
        job_title: first_non_empty([
            record.job_title.as_deref(),
            record.position.as_deref(),
            record.title.as_deref(),
        ]),
        company: first_non_empty([record.company.as_deref(), record.employer.as_deref()]),
        location: text(&record.location),
        start_date: text(&record.start_date),
        end_date: text(&record.end_date),
        is_current: record.is_current.or(record.current).unwrap_or(false),
        description: text(&record.description),
        achievements: clean_list(&record.achievements),
    }
}

fn normalize_education(record: &EducationRecord) -> Education {
    Education {
        degree: text(&record.degree),
        institution: first_non_empty([record.institution.as_deref(), record.school.as_deref()]),
        field_of_study: text(&record.field_of_study),
        location: text(&record.location),
        start_date: text(&record.start_date),
        end_date: text(&record.end_date),
        gpa: text(&record.gpa),
        description: text(&record.description),
    }
}

fn normalize_skill(record: &SkillRecord) -> Skill {
    match record {
        SkillRecord::Name(name) => Skill {
            name: name.trim().to_string(),
            level: String::new(),
        },
        SkillRecord::Detailed { name, level } => Skill {
            name: text(name),
            level: text(level),
        },
    }
}

fn normalize_language(record: &LanguageRecord) -> Language {
    Language {
        name: first_non_empty([record.name.as_deref(), record.language.as_deref()]),
        proficiency: first_non_empty([record.proficiency.as_deref(), record.level.as_deref()]),
    }
}

fn normalize_reference(record: &ReferenceRecord) -> Reference {
    Reference {
        name: text(&record.name),
        position: first_non_empty([record.position.as_deref(), record.title.as_deref()]),
        company: text(&record.company),
        email: text(&record.email),
        phone: text(&record.phone),
    }
}

/// Both shapes end up as the same list: a single string is split on commas, semicolons and
/// line breaks.
fn normalize_hobbies(hobbies: Option<&Hobbies>) -> Vec<String> {
    let entries: Vec<&str> = match hobbies {
        None => Vec::new(),
        Some(Hobbies::Single(hobbies)) => hobbies
            .split(|character| matches!(character, ',' | ';' | '\n'))
            .collect(),
        Some(Hobbies::Many(hobbies)) => hobbies.iter().map(String::as_str).collect(),
    };

    entries
        .into_iter()
        .map(str::trim)
        .filter(|hobby| !hobby.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_certification(record: &CertificationRecord) -> Certification {
    match record {
        CertificationRecord::Name(name) => Certification {
            name: name.trim().to_string(),
            ..Certification::default()
        },
        CertificationRecord::Detailed { name, issuer, date } => Certification {
            name: text(name),
            issuer: text(issuer),
            date: text(date),
        },
    }
}

fn normalize_project(record: &ProjectRecord) -> Project {
    Project {
        name: text(&record.name),
        description: text(&record.description),
        url: first_non_empty([record.url.as_deref(), record.link.as_deref()]),
        technologies: clean_list(&record.technologies),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume_from(json: &str) -> Resume {
        Resume::from_record(&ResumeRecord::from_json_str(json).unwrap())
    }

    #[test]
    fn empty_record_yields_an_empty_resume() {
        assert_eq!(resume_from("{}"), Resume::default());
    }

    #[test]
    fn location_falls_back_to_its_parts() {
        let resume = resume_from(
            r#"{ "personalInfo": { "city": "Lyon", "region": " ", "country": "France" } }"#,
        );
        assert_eq!(resume.personal_info.location, "Lyon, France");

        let resume = resume_from(
            r#"{ "personalInfo": { "address": "1 Main St", "city": "Lyon" } }"#,
        );
        assert_eq!(resume.personal_info.location, "1 Main St");
    }

    #[test]
    fn summary_may_live_inside_personal_info() {
        let resume = resume_from(r#"{ "personalInfo": { "summary": " Builder. " } }"#);
        assert_eq!(resume.summary, "Builder.");

        let resume =
            resume_from(r#"{ "summary": "Top", "personalInfo": { "summary": "Nested" } }"#);
        assert_eq!(resume.summary, "Top");
    }

    #[test]
    fn hobbies_in_both_shapes_normalize_identically() {
        let single = resume_from(r#"{ "hobbies": "Chess, Hiking;  Jazz\n" }"#);
        let many = resume_from(r#"{ "hobbies": ["Chess", " Hiking", "", "Jazz"] }"#);

        assert_eq!(single.hobbies, vec!["Chess", "Hiking", "Jazz"]);
        assert_eq!(single.hobbies, many.hobbies);
    }

    #[test]
    fn empty_entries_are_dropped() {
        let resume = resume_from(
            r#"{
                "workExperience": [ { "location": "Nowhere" }, { "position": "Engineer" } ],
                "skills": [ { "level": "Expert" }, "  ", "Rust" ],
                "references": [ { "email": "a@b.c" } ],
                "projects": [ { "url": "https://example.com" } ]
            }"#,
        );

        assert_eq!(resume.work_experience.len(), 1);
        assert_eq!(resume.work_experience[0].job_title, "Engineer");
        assert_eq!(resume.skills.len(), 1);
        assert!(resume.references.is_empty());
        assert!(resume.projects.is_empty());
    }

    #[test]
    fn current_flag_accepts_both_spellings() {
        let resume = resume_from(
            r#"{ "workExperience": [ { "company": "A", "current": true }, { "company": "B" } ] }"#,
        );

        assert!(resume.work_experience[0].is_current);
        assert!(!resume.work_experience[1].is_current);
    }
}

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::repo::ProfileRecord;

/// Social links live under their own sub-object on the profile document.
/// Each is independently optional; unset links are not stored or returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// One work-history entry. Entries get server-assigned ids so deletion can
/// address them stably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Create/update body. Scalars and social links arrive flat; `status` and
/// `skills` are required, everything else only touches the stored profile
/// when provided.
#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub skills: String,
    pub github_username: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

/// The columns a profile submission writes. Optional scalars stay `None`
/// when the request omitted (or blanked) them, which the upsert translates
/// into "leave the stored value alone".
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
}

/// Comma-separated skills → trimmed, non-empty entries, order preserved.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl UpsertProfileRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.status.is_empty() {
            errors.push("status is required".to_string());
        }
        if self.skills.is_empty() {
            errors.push("skills is required".to_string());
        }
        errors
    }

    pub fn into_fields(self) -> ProfileFields {
        let skills = parse_skills(&self.skills);
        ProfileFields {
            company: none_if_blank(self.company),
            website: none_if_blank(self.website),
            location: none_if_blank(self.location),
            bio: none_if_blank(self.bio),
            status: self.status,
            github_username: none_if_blank(self.github_username),
            skills,
            social: SocialLinks {
                youtube: none_if_blank(self.youtube),
                twitter: none_if_blank(self.twitter),
                facebook: none_if_blank(self.facebook),
                linkedin: none_if_blank(self.linkedin),
                instagram: none_if_blank(self.instagram),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExperienceRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub location: Option<String>,
    #[serde(default)]
    pub from: String,
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

impl ExperienceRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.is_empty() {
            errors.push("Title is required".to_string());
        }
        if self.company.is_empty() {
            errors.push("Company is required".to_string());
        }
        if self.from.is_empty() {
            errors.push("From date is required".to_string());
        }
        errors
    }

    pub fn into_entry(self) -> Experience {
        Experience {
            id: Uuid::new_v4(),
            title: self.title,
            company: self.company,
            location: none_if_blank(self.location),
            from: self.from,
            to: none_if_blank(self.to),
            current: self.current,
            description: none_if_blank(self.description),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EducationRequest {
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field_of_study: String,
    #[serde(default)]
    pub from: String,
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

impl EducationRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.school.is_empty() {
            errors.push("School name is required".to_string());
        }
        if self.degree.is_empty() {
            errors.push("Degree is required".to_string());
        }
        if self.field_of_study.is_empty() {
            errors.push("Field of study is required".to_string());
        }
        if self.from.is_empty() {
            errors.push("From date is required".to_string());
        }
        errors
    }

    pub fn into_entry(self) -> Education {
        Education {
            id: Uuid::new_v4(),
            school: self.school,
            degree: self.degree,
            field_of_study: self.field_of_study,
            from: self.from,
            to: none_if_blank(self.to),
            current: self.current,
            description: none_if_blank(self.description),
        }
    }
}

/// Owning user fields populated onto every profile response.
#[derive(Debug, Serialize)]
pub struct ProfileUser {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user: ProfileUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ProfileRecord> for ProfileResponse {
    fn from(record: ProfileRecord) -> Self {
        Self {
            id: record.id,
            user: ProfileUser {
                id: record.user_id,
                name: record.user_name,
                avatar: record.user_avatar,
            },
            company: record.company,
            website: record.website,
            location: record.location,
            bio: record.bio,
            status: record.status,
            github_username: record.github_username,
            skills: record.skills,
            social: record.social.0,
            experience: record.experience.0,
            education: record.education.0,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

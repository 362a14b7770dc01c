use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DefaultOnError, DeserializeAs};

/// Raw resume payload as posted by the front-end.
///
/// Every field is optional. Values of the wrong shape (a string where a list is
/// expected, an object where text is expected, `null` anywhere) collapse to the
/// empty default instead of failing the request.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResumeInput {
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub personal: Personal,
    #[serde_as(deserialize_as = "LenientText")]
    pub summary: String,
    #[serde_as(deserialize_as = "DefaultOnError<Vec<LenientText>>")]
    pub skills: Vec<String>,
    #[serde_as(deserialize_as = "DefaultOnError<Vec<DefaultOnError>>")]
    pub education: Vec<Education>,
    #[serde_as(deserialize_as = "DefaultOnError<Vec<DefaultOnError>>")]
    pub projects: Vec<Project>,
    #[serde_as(deserialize_as = "DefaultOnError<Vec<DefaultOnError>>")]
    pub certificates: Vec<Certificate>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Personal {
    #[serde(rename = "fullName", alias = "full_name")]
    #[serde_as(deserialize_as = "LenientText")]
    pub full_name: String,
    #[serde_as(deserialize_as = "LenientText")]
    pub email: String,
    #[serde_as(deserialize_as = "LenientText")]
    pub phone: String,
    #[serde_as(deserialize_as = "LenientText")]
    pub location: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Education {
    #[serde_as(deserialize_as = "LenientText")]
    pub school: String,
    #[serde_as(deserialize_as = "LenientText")]
    pub degree: String,
    #[serde_as(deserialize_as = "LenientText")]
    pub year: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Project {
    #[serde_as(deserialize_as = "LenientText")]
    pub title: String,
    #[serde_as(deserialize_as = "LenientText")]
    pub description: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Certificate {
    #[serde_as(deserialize_as = "LenientText")]
    pub name: String,
    #[serde_as(deserialize_as = "LenientText")]
    pub issuer: String,
    #[serde_as(deserialize_as = "LenientText")]
    pub date: String,
}

/// Reads any JSON value as text: strings pass through, numbers and booleans are
/// stringified, everything else (null, arrays, objects) becomes empty.
pub struct LenientText;

impl<'de> DeserializeAs<'de, String> for LenientText {
    fn deserialize_as<D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Scalar {
            Text(String),
            Integer(i64),
            Float(f64),
            Flag(bool),
            Other(IgnoredAny),
        }

        Ok(match Scalar::deserialize(deserializer)? {
            Scalar::Text(s) => s,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(x) => x.to_string(),
            Scalar::Flag(b) => b.to_string(),
            Scalar::Other(_) => String::new(),
        })
    }
}

/// Body shared by `/generate` and `/preview`.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct RenderRequest {
    pub template_id: i64,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub data: ResumeInput,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImproveSummaryRequest {
    #[serde_as(deserialize_as = "LenientText")]
    pub summary: String,
}

/// On failure `improved_summary` echoes the submitted text and `error` says why.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImproveSummaryResponse {
    pub improved_summary: String,
    pub error: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SuggestSkillsRequest {
    #[serde_as(deserialize_as = "DefaultOnError<Vec<LenientText>>")]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SuggestSkillsResponse {
    pub suggested_skills: Vec<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImproveProjectRequest {
    #[serde_as(deserialize_as = "LenientText")]
    pub project_description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImproveProjectResponse {
    pub improved_project: String,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_default_to_empty() {
        let input: ResumeInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input, ResumeInput::default());
    }

    #[test]
    fn wrong_shapes_collapse_to_defaults() {
        let input: ResumeInput = serde_json::from_value(json!({
            "personal": "Ada",
            "summary": {"nested": true},
            "skills": "Python",
            "education": [42, {"school": "MIT", "year": 1843}],
            "projects": null,
            "certificates": [{"name": ["x"], "issuer": "IEEE", "date": false}]
        }))
        .unwrap();

        assert_eq!(input.personal, Personal::default());
        assert_eq!(input.summary, "");
        assert!(input.skills.is_empty());
        assert_eq!(input.education.len(), 2);
        assert_eq!(input.education[0], Education::default());
        assert_eq!(input.education[1].school, "MIT");
        assert_eq!(input.education[1].degree, "");
        assert_eq!(input.education[1].year, "1843");
        assert!(input.projects.is_empty());
        assert_eq!(input.certificates[0].name, "");
        assert_eq!(input.certificates[0].issuer, "IEEE");
        assert_eq!(input.certificates[0].date, "false");
    }

    #[test]
    fn personal_accepts_camel_and_snake_case_name() {
        let camel: Personal = serde_json::from_value(json!({"fullName": "Ada Lovelace"})).unwrap();
        let snake: Personal = serde_json::from_value(json!({"full_name": "Ada Lovelace"})).unwrap();
        assert_eq!(camel.full_name, "Ada Lovelace");
        assert_eq!(snake.full_name, "Ada Lovelace");
    }

    #[test]
    fn render_request_tolerates_non_object_data() {
        let req: RenderRequest =
            serde_json::from_value(json!({"template_id": 2, "data": "not an object"})).unwrap();
        assert_eq!(req.template_id, 2);
        assert_eq!(req.data, ResumeInput::default());
    }

    #[test]
    fn skills_keep_input_order_and_stringify_scalars() {
        let input: ResumeInput =
            serde_json::from_value(json!({"skills": ["Rust", 7, null, "Go"]})).unwrap();
        assert_eq!(input.skills, vec!["Rust", "7", "", "Go"]);
    }

    #[test]
    fn ai_requests_tolerate_bad_shapes() {
        let skills: SuggestSkillsRequest =
            serde_json::from_value(json!({"skills": ["Rust", null, 3]})).unwrap();
        assert_eq!(skills.skills, vec!["Rust", "", "3"]);

        let skills: SuggestSkillsRequest = serde_json::from_value(json!({"skills": "Rust"})).unwrap();
        assert!(skills.skills.is_empty());

        let summary: ImproveSummaryRequest = serde_json::from_value(json!({"summary": null})).unwrap();
        assert_eq!(summary.summary, "");

        let project: ImproveProjectRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(project.project_description, "");
    }
}

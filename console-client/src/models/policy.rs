use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::Validate;

/// Whether a matching request is allowed or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "allow",
            Effect::Deny => "deny",
        }
    }
}

impl Serialize for Effect {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// Older records capitalize the effect ("Allow"/"Deny"); accept either case.
impl<'de> Deserialize<'de> for Effect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.to_ascii_lowercase().as_str() {
            "allow" => Ok(Effect::Allow),
            "deny" => Ok(Effect::Deny),
            _ => Err(D::Error::unknown_variant(&raw, &["allow", "deny"])),
        }
    }
}

/// Canonical rule carried by a policy.
///
/// The backend has two shapes in the wild: current records carry a single
/// `resource`/`action` pair, older ones carry `subjects`/`actions`/
/// `resources` arrays. Both normalize into this tagged form at the
/// deserialization boundary so the rest of the crate never branches on
/// optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyRule {
    Single {
        resource: String,
        action: String,
    },
    Legacy {
        subjects: Vec<String>,
        actions: Vec<String>,
        resources: Vec<String>,
    },
}

/// Access policy record in its normalized form.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub rule: PolicyRule,
    pub effect: Effect,
    pub priority: i32,
    pub user_id: Option<String>,
    pub enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyWire {
    id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subjects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resources: Option<Vec<String>>,
    effect: Effect,
    #[serde(default)]
    priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

fn default_enabled() -> bool {
    true
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = PolicyWire::deserialize(deserializer)?;
        // When both shapes are present the current pair wins.
        let rule = match (wire.resource, wire.action) {
            (Some(resource), Some(action)) => PolicyRule::Single { resource, action },
            (None, None) => {
                let subjects = wire.subjects.unwrap_or_default();
                let actions = wire.actions.unwrap_or_default();
                let resources = wire.resources.unwrap_or_default();
                if subjects.is_empty() && actions.is_empty() && resources.is_empty() {
                    return Err(D::Error::custom(
                        "policy carries neither a resource/action pair nor legacy rule arrays",
                    ));
                }
                PolicyRule::Legacy {
                    subjects,
                    actions,
                    resources,
                }
            }
            _ => {
                return Err(D::Error::custom(
                    "policy resource/action pair is incomplete",
                ))
            }
        };

        Ok(Policy {
            id: wire.id,
            name: wire.name,
            description: wire.description,
            rule,
            effect: wire.effect,
            priority: wire.priority,
            user_id: wire.user_id,
            enabled: wire.enabled,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        })
    }
}

impl Serialize for Policy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut wire = PolicyWire {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            resource: None,
            action: None,
            subjects: None,
            actions: None,
            resources: None,
            effect: self.effect,
            priority: self.priority,
            user_id: self.user_id.clone(),
            enabled: self.enabled,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        match &self.rule {
            PolicyRule::Single { resource, action } => {
                wire.resource = Some(resource.clone());
                wire.action = Some(action.clone());
            }
            PolicyRule::Legacy {
                subjects,
                actions,
                resources,
            } => {
                wire.subjects = Some(subjects.clone());
                wire.actions = Some(actions.clone());
                wire.resources = Some(resources.clone());
            }
        }
        wire.serialize(serializer)
    }
}

/// Payload for creating a policy. New policies always use the single
/// resource/action shape.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCreate {
    #[validate(length(min = 1, message = "Policy name is required"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Resource is required"))]
    pub resource: String,
    #[validate(length(min = 1, message = "Action is required"))]
    pub action: String,
    pub effect: Effect,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Partial policy update; unset fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

//! Chat-to-transaction intent parsing
//!
//! Turns a free-form sentence ("pagova 25 euro për rrymë", "krijo synim
//! për banesë") into one of three tagged intents for the user to confirm.
//! Unlike the receipt path, unintelligible input is a soft miss: the
//! caller gets `None` and asks the user to rephrase. A recognized action
//! with malformed fields is still a hard validation failure so bad data
//! never reaches the confirmation step.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calc::TransactionKind;
use crate::error::{Error, Result};

use super::client::{ChatCompletionRequest, GroqClient, CHAT_MODEL};
use super::parsing::extract_json;

const INTENT_ACTIONS: [&str; 3] = ["create_goal", "add_to_goal", "transaction"];

const ALLOWED_CATEGORIES: &str = "'Ushqim', 'Transport', 'Qira', 'Argëtim', 'Shëndet', \
'Shopping', 'Fatura', 'Paga', 'Te Ardhura', 'Dhurata', 'Tjetër'";

/// What the user asked for, tagged by the `action` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TransactionIntent {
    /// Create a new savings goal.
    CreateGoal {
        title: String,
        target_amount: f64,
        #[serde(default)]
        current_amount: f64,
    },
    /// Add money to an existing goal, referenced by title.
    AddToGoal { goal_title: String, amount: f64 },
    /// Log a plain income/expense transaction.
    Transaction {
        amount: f64,
        category: String,
        #[serde(rename = "type")]
        kind: TransactionKind,
        #[serde(default)]
        notes: String,
    },
}

impl GroqClient {
    /// Parse a natural-language sentence into a [`TransactionIntent`].
    ///
    /// `goal_titles` are the user's existing goals, passed so the model can
    /// resolve "shto 50 tek banesa" to the right goal.
    ///
    /// Returns `Ok(None)` when the model output contains no JSON or an
    /// unrecognized `action`; both mean "ask the user to rephrase".
    /// Configuration and HTTP failures are classified errors like the
    /// receipt path; a recognized action with malformed fields is
    /// [`Error::Validation`].
    pub async fn parse_intent(
        &self,
        text: &str,
        goal_titles: &[String],
    ) -> Result<Option<TransactionIntent>> {
        let prompt = intent_prompt(text, goal_titles);
        let request = ChatCompletionRequest::text(CHAT_MODEL, &prompt, 0.1, None);
        let content = self.chat_completion(&request).await?;

        let payload = match extract_json(&content) {
            Some(payload) => payload,
            None => {
                debug!("intent response contained no JSON");
                return Ok(None);
            }
        };

        match payload.get("action").and_then(|a| a.as_str()) {
            Some(action) if INTENT_ACTIONS.contains(&action) => {
                let intent = serde_json::from_value(payload.clone())
                    .map_err(|e| Error::Validation(format!("intent {}: {}", action, e)))?;
                Ok(Some(intent))
            }
            other => {
                warn!(action = ?other, "unrecognized intent action");
                Ok(None)
            }
        }
    }
}

fn intent_prompt(text: &str, goal_titles: &[String]) -> String {
    let goals_line = if goal_titles.is_empty() {
        "(asnjë synim ekzistues)".to_string()
    } else {
        goal_titles.join(", ")
    };

    format!(
        r#"Ti je një asistent që konverton tekstin natyral në JSON për një aplikacion finance.
Teksti i userit: "{text}"

Synimet ekzistuese të userit: {goals_line}
Kategoritë e lejuara: {ALLOWED_CATEGORIES}.

Kthe VETËM një objekt JSON me fushën "action", një nga:
1. "create_goal" - user kërkon të krijojë një synim kursimi:
   {{ "action": "create_goal", "title": "string", "target_amount": number, "current_amount": number }}
2. "add_to_goal" - user shton para tek një synim ekzistues (goal_title nga lista më lart):
   {{ "action": "add_to_goal", "goal_title": "string", "amount": number }}
3. "transaction" - shpenzim ose e ardhur e zakonshme:
   {{ "action": "transaction", "amount": number, "category": "string", "type": "income" | "expense", "notes": "string" }}

Rregullat:
1. Gjej shumën (amount) si numër (p.sh. 5.5).
2. Zgjidh kategorinë më të përshtatshme nga lista.
3. Krijo një përshkrim të shkurtër (notes) nga teksti.
4. Kthe VETËM objektin JSON, pa asnjë tekst shtesë.

Shembull:
User: "Bleva kafe 2 euro"
Output: {{ "action": "transaction", "amount": 2, "category": "Ushqim", "type": "expense", "notes": "Kafe" }}"#
    )
}

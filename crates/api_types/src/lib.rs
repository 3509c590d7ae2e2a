use serde::{Deserialize, Serialize};

pub mod transaction {
    use super::*;

    /// A row of the remote `transactions` table.
    ///
    /// `kind` is kept as text so older rows (`entrada` / `saida`) still decode;
    /// `amount` is a numeric column and may arrive as a JSON number or string.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TransactionRow {
        pub id: i64,
        #[serde(default)]
        pub description: Option<String>,
        pub amount: serde_json::Value,
        pub kind: String,
        /// ISO date; some backends append a time part.
        pub date: String,
    }

    /// Insert payload. The backend assigns `id`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub user_id: String,
        pub description: String,
        /// Plain decimal string, e.g. `"40.50"`.
        pub amount: String,
        pub kind: String,
        pub date: String,
    }

    /// Partial update. Absent fields are not sent.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionPatch {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub amount: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub kind: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<String>,
    }
}

pub mod subscription {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubscriptionStatus {
        pub active: bool,
    }
}

/// Error body returned by the REST layer.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::transaction::*;

    #[test]
    fn row_accepts_numeric_or_text_amount() {
        let row: TransactionRow = serde_json::from_str(
            r#"{"id": 3, "description": null, "amount": 40.5, "kind": "saida", "date": "2025-01-05"}"#,
        )
        .unwrap();
        assert!(row.amount.is_number());
        assert!(row.description.is_none());

        let row: TransactionRow = serde_json::from_str(
            r#"{"id": 4, "amount": "12.00", "kind": "inflow", "date": "2025-01-05T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(row.amount.as_str(), Some("12.00"));
    }

    #[test]
    fn patch_skips_absent_fields() {
        let patch = TransactionPatch {
            amount: Some("0.00".to_string()),
            ..TransactionPatch::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"amount":"0.00"}"#);
    }
}

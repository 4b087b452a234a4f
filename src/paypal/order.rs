use crate::intent::ValidatedRequest;

#[derive(Debug, serde::Serialize)]
pub struct OrderRequest {
    pub intent: OrderIntent,
    pub purchase_units: [PurchaseUnit; 1],
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderIntent {
    Capture,
}

#[derive(Debug, serde::Serialize)]
pub struct PurchaseUnit {
    pub amount: Amount,
}

#[derive(Debug, serde::Serialize)]
pub struct Amount {
    pub currency_code: &'static str,
    /// Major units, e.g. `10.00`
    pub value: String,
}

impl From<&ValidatedRequest> for OrderRequest {
    fn from(request: &ValidatedRequest) -> Self {
        Self {
            intent: OrderIntent::Capture,
            purchase_units: [PurchaseUnit {
                amount: Amount {
                    currency_code: request.currency().code(),
                    value: request.amount().to_string(),
                },
            }],
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct OrderResponse {
    pub id: String,
    /// `CREATED`, `APPROVED`, `VOIDED`, ...
    #[serde(default)]
    pub status: Option<String>,
}

impl OrderResponse {
    pub fn is_voided(&self) -> bool {
        self.status.as_deref() == Some("VOIDED")
    }
}

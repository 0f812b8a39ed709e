use serde::Deserialize;

use crate::config::Config;
use crate::models::{Admin, Event, SelectedMenus};
use crate::provider::{
    BackUrls, Payer, PayerPhone, PaymentMetadata, PreferenceItem, PreferenceRequest, APPROVED,
};
use crate::utils::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct BuyerDetails {
    pub name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub selected_menus: SelectedMenus,
}

impl BuyerDetails {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Buyer name and last name are required".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(AppError::ValidationError(
                "A valid buyer email is required".to_string(),
            ));
        }
        Ok(())
    }

    fn tel(&self) -> Option<String> {
        self.tel
            .as_deref()
            .map(str::trim)
            .filter(|tel| !tel.is_empty())
            .map(str::to_string)
    }
}

/// A preference ready to be sent, with the credentials it must be sent with.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub access_token: String,
    pub preference: PreferenceRequest,
}

/// Builds the provider checkout for one ticket. The money goes to the
/// event's seller when they have credentials, to the platform otherwise.
/// Everything the webhook needs later travels in the metadata, since that is
/// the only part of the preference the provider echoes on the payment.
pub fn build_checkout(
    event: &Event,
    seller: Option<&Admin>,
    buyer: &BuyerDetails,
    config: &Config,
) -> Checkout {
    let access_token = seller
        .and_then(Admin::seller_access_token)
        .unwrap_or(&config.mercadopago_access_token)
        .to_string();

    let event_id = event.id.to_string();
    let tel = buyer.tel();

    let preference = PreferenceRequest {
        items: vec![PreferenceItem {
            title: event.name.clone(),
            quantity: 1,
            unit_price: event.price,
            currency_id: config.currency_id.clone(),
        }],
        payer: Payer {
            name: buyer.name.trim().to_string(),
            surname: buyer.last_name.trim().to_string(),
            email: buyer.email.trim().to_string(),
            phone: tel.clone().map(|number| PayerPhone { number }),
        },
        metadata: PaymentMetadata {
            event_id: Some(event_id.clone()),
            seller_id: Some(event.created_by.to_string()),
            name: Some(buyer.name.trim().to_string()),
            last_name: Some(buyer.last_name.trim().to_string()),
            email: Some(buyer.email.trim().to_string()),
            tel,
            price: Some(event.price),
            selected_menus: Some(buyer.selected_menus.clone()),
        },
        back_urls: BackUrls {
            success: format!("{}/payment_success", config.client_url),
            failure: format!("{}/payment_failure", config.client_url),
            pending: format!("{}/payment_pending", config.client_url),
        },
        auto_return: APPROVED.to_string(),
        external_reference: event_id,
        notification_url: format!("{}/webhook", config.server_url),
    };

    Checkout {
        access_token,
        preference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admin, on_sale_event, test_config, PLATFORM_TOKEN};
    use serde_json::json;

    fn buyer() -> BuyerDetails {
        BuyerDetails {
            name: " Ana ".to_string(),
            last_name: "García".to_string(),
            email: "ana@example.com".to_string(),
            tel: Some("  ".to_string()),
            selected_menus: SelectedMenus::from([("0".to_string(), "classic".to_string())]),
        }
    }

    #[test]
    fn test_seller_credentials_take_precedence() {
        let seller = admin("APP_USR-seller");
        let event = on_sale_event(seller.id);

        let checkout = build_checkout(&event, Some(&seller), &buyer(), &test_config());
        assert_eq!(checkout.access_token, "APP_USR-seller");
    }

    #[test]
    fn test_platform_credentials_are_the_fallback() {
        let seller = admin("");
        let event = on_sale_event(seller.id);
        let config = test_config();

        let without_token = build_checkout(&event, Some(&seller), &buyer(), &config);
        assert_eq!(without_token.access_token, PLATFORM_TOKEN);

        let without_seller = build_checkout(&event, None, &buyer(), &config);
        assert_eq!(without_seller.access_token, PLATFORM_TOKEN);
    }

    #[test]
    fn test_preference_carries_event_price_and_metadata() {
        let seller = admin("APP_USR-seller");
        let event = on_sale_event(seller.id);

        let checkout = build_checkout(&event, Some(&seller), &buyer(), &test_config());
        let body = serde_json::to_value(&checkout.preference).unwrap();

        assert_eq!(body["items"][0]["unit_price"], json!(2500.0));
        assert_eq!(body["items"][0]["quantity"], 1);
        assert_eq!(body["items"][0]["currency_id"], "ARS");
        assert_eq!(body["external_reference"], event.id.to_string());
        assert_eq!(body["notification_url"], "http://server.test/webhook");
        assert_eq!(body["back_urls"]["success"], "http://client.test/payment_success");
        assert_eq!(body["auto_return"], "approved");

        let metadata = &body["metadata"];
        assert_eq!(metadata["event_id"], event.id.to_string());
        assert_eq!(metadata["seller_id"], seller.id.to_string());
        assert_eq!(metadata["name"], "Ana");
        assert_eq!(metadata["email"], "ana@example.com");
        assert_eq!(metadata["selected_menus"]["0"], "classic");
        // Blank phone numbers are dropped rather than sent empty.
        assert!(metadata.get("tel").is_none());
        assert!(body["payer"].get("phone").is_none());
    }

    #[test]
    fn test_buyer_validation() {
        assert!(buyer().validate().is_ok());

        let mut missing_name = buyer();
        missing_name.name = " ".to_string();
        assert!(missing_name.validate().is_err());

        let mut bad_email = buyer();
        bad_email.email = "not-an-email".to_string();
        assert!(bad_email.validate().is_err());
    }
}

//! # Value Objects Sample
//!
//! Customers whose address, payment details and tags are stored as encoded
//! columns and used as typed objects.
//!
//! ## Core Components
//!
//! - **[model](value_objects_sample::model)**: The customer class and its value objects.
//! - **[store](value_objects_sample::store)**: An in-memory row table behind a Tokio actor.
//! - **[repository](value_objects_sample::repository)**: Creates, finds and saves customers
//!   against the table.
//! - **[lifecycle](value_objects_sample::lifecycle)**: Starts and stops the whole system.
//!
//! ## Quick Start
//!
//! [`main`] creates a customer from nested form values, reads it back, switches
//! its payment method and shows a rejected update.

use serde_json::json;
use tracing::{error, info, Instrument};
use value_objects::logging::setup_tracing;
use value_objects::{into_attributes, Model, ValueObjectsBehavior};
use value_objects_sample::lifecycle::SampleSystem;
use value_objects_sample::model::{Address, InvoicePayment, PAYMENT_METHOD};
use value_objects_sample::repository::{record_id, Repository};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting value objects sample");

    let system = SampleSystem::new().map_err(|e| e.to_string())?;
    let customers = &system.customers;

    // Form values use dotted names for nested object fields
    let values = into_attributes(json!({
        "name": "Ada Lovelace",
        "address.street": "12 St James's Square",
        "address.city": "London",
        "address.zip": "10001",
        "payment_method": "card",
        "payment.holder": "A. Lovelace",
        "payment.number": "4111111111111111",
        "tags.0.color": "green"
    }))
    .ok_or("form values must be an object")?;

    let span = tracing::info_span!("customer_creation");
    let customer = async {
        info!("Creating customer");
        customers.create(&values).await.map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;
    let id = record_id(&customer).ok_or("customer has no id")?;
    info!(id, "Customer created");

    let span = tracing::info_span!("payment_switch", id);
    async {
        let mut found = customers
            .find(id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or("customer not found")?;

        let city = found
            .behavior_mut::<ValueObjectsBehavior>()
            .ok_or("customer has no value objects")?
            .with_object::<Model<Address>, _>("address", |address| address.data().city.clone())
            .map_err(|e| e.to_string())?;
        info!(city = ?city, "Customer loaded");

        found
            .set_attribute(PAYMENT_METHOD, json!("invoice"))
            .map_err(|e| e.to_string())?;
        found
            .set_attribute("payment.email", json!("ada@example.com"))
            .map_err(|e| e.to_string())?;
        let saved = customers.save(&mut found).await.map_err(|e| e.to_string())?;
        info!(saved, "Payment method switched to invoice");

        let terms = found
            .behavior_mut::<ValueObjectsBehavior>()
            .ok_or("customer has no value objects")?
            .with_object::<Model<InvoicePayment>, _>("payment", |payment| payment.data().terms_days)
            .map_err(|e| e.to_string())?;
        info!(terms = ?terms, "Invoice payment in place");
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    // An invalid nested field is reported under its dotted name
    let span = tracing::info_span!("rejected_update", id);
    let rejected = async {
        let mut found = customers
            .find(id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or("customer not found")?;
        found
            .set_attribute("address.zip", json!("123"))
            .map_err(|e| e.to_string())?;
        customers.save(&mut found).await.map_err(|e| e.to_string())?;
        Ok::<_, String>(found.errors().clone())
    }
    .instrument(span)
    .await?;

    for (field, messages) in rejected.iter() {
        error!(field = %field, messages = ?messages, "Update rejected");
    }

    system.shutdown().await?;

    info!("Sample completed successfully");
    Ok(())
}

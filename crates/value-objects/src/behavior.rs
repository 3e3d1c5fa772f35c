//! # Value Objects Behavior
//!
//! [`ValueObjectsBehavior`] keeps three representations of every mapped attribute in
//! sync:
//!
//! - the live sub-object, owned by the behavior and shared with the host slot;
//! - the encoded text written into the column before validation and storage;
//! - the baseline (old) slot used by the host's change detection.
//!
//! ## Lifecycle
//!
//! | event | action |
//! |-------|--------|
//! | `Init` | [`init_objects`](ValueObjectsBehavior::init_objects) when eager initialization is on |
//! | `AfterFind` | [`after_find`](ValueObjectsBehavior::after_find) |
//! | `Reinitialize` | [`re_init_objects`](ValueObjectsBehavior::re_init_objects) |
//! | `BeforeValidate`, `BeforeInsert`, `BeforeUpdate` | initialize, then [`put_json`](ValueObjectsBehavior::put_json) |
//! | `AfterValidate` | objects back into current slots, then [`validate_objects`](ValueObjectsBehavior::validate_objects), encoding cache dropped |
//! | `AfterInsert`, `AfterUpdate` | objects into old and current slots, encoding cache dropped |
//! | `AfterSetAttributes`, `AfterSetAttribute` | dotted-path routing |
//!
//! ## Epochs
//!
//! Sub-objects are created at most once per epoch. A `Reinitialize` event starts a
//! new epoch: every object is dropped and rebuilt.
//!
//! ## Encoding cache
//!
//! The encoded text of each object is cached for one cycle only: it is dropped
//! after validation, after a write, on reload and whenever the object is written
//! through this behavior. Within a cycle, mutating an object through its `Rc`
//! handle bypasses the cache; use [`with_object`](ValueObjectsBehavior::with_object),
//! which drops the cached text.

use crate::attribute::{into_attributes, is_structured, AttributeValue, Attributes, SharedObject};
use crate::codec::{Codec, JsonCodec};
use crate::config::BehaviorConfig;
use crate::declaration::{Declaration, Declarations};
use crate::error::{Result, ValueObjectError};
use crate::events::{Behavior, RecordEvent};
use crate::host::Host;
use crate::object::{ErrorBag, ValueObject};
use crate::path;
use crate::registry::Registry;
use serde_json::Value;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Which host slot [`ValueObjectsBehavior::put_objects`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Current,
    Old,
}

/// Maps declared host attributes to live sub-objects.
pub struct ValueObjectsBehavior<C: Codec = JsonCodec> {
    registry: Rc<Registry>,
    codec: C,
    config: BehaviorConfig,
    objects: BTreeMap<String, SharedObject>,
    classes: BTreeMap<String, String>,
    json: HashMap<String, String>,
    initialized: bool,
    epoch: u64,
}

impl ValueObjectsBehavior<JsonCodec> {
    pub fn new(registry: Rc<Registry>) -> Self {
        Self {
            registry,
            codec: JsonCodec,
            config: BehaviorConfig::default(),
            objects: BTreeMap::new(),
            classes: BTreeMap::new(),
            json: HashMap::new(),
            initialized: false,
            epoch: 0,
        }
    }
}

impl<C: Codec> ValueObjectsBehavior<C> {
    pub fn with_config(mut self, config: BehaviorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_codec<D: Codec>(self, codec: D) -> ValueObjectsBehavior<D> {
        ValueObjectsBehavior {
            registry: self.registry,
            codec,
            config: self.config,
            objects: self.objects,
            classes: self.classes,
            json: self.json,
            initialized: self.initialized,
            epoch: self.epoch,
        }
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Mapped attributes of the host's class.
    pub fn declarations(&self, host: &dyn Host) -> Declarations {
        self.registry.declarations(host)
    }

    /// The live sub-object of `attribute`.
    pub fn object(&self, attribute: &str) -> Result<SharedObject> {
        self.objects
            .get(attribute)
            .cloned()
            .ok_or_else(|| ValueObjectError::NotCreated(attribute.to_string()))
    }

    /// Runs `f` on the sub-object of `attribute` downcast to `O`.
    ///
    /// Returns `Ok(None)` when the object is of another type. The cached encoding
    /// of the attribute is dropped either way.
    pub fn with_object<O, R>(&mut self, attribute: &str, f: impl FnOnce(&mut O) -> R) -> Result<Option<R>>
    where
        O: ValueObject,
    {
        let object = self.object(attribute)?;
        self.json.remove(attribute);
        let mut guard = object.borrow_mut();
        let result = guard.as_any_mut().downcast_mut::<O>().map(f);
        Ok(result)
    }

    /// Class the sub-object of `attribute` was created from.
    pub fn class_of(&self, attribute: &str) -> Option<&str> {
        self.classes.get(attribute).map(String::as_str)
    }

    /// The cached encoding of `attribute`, if any.
    pub fn json(&self, attribute: &str) -> Option<&str> {
        self.json.get(attribute).map(String::as_str)
    }

    /// Attributes whose sub-object differs from its own baseline snapshot.
    pub fn changed_objects(&self) -> Vec<String> {
        self.objects
            .iter()
            .filter(|(_, object)| object.borrow().is_changed())
            .map(|(attribute, _)| attribute.clone())
            .collect()
    }

    /// Creates the sub-objects of this epoch, once.
    ///
    /// With [`Slot::Current`] each object is written into its current slot. A
    /// persisted host also gets each object as baseline, which makes the
    /// attribute read as unchanged.
    pub fn init_objects(&mut self, host: &mut dyn Host, target: Slot) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.create_objects(host)?;
        if target == Slot::Current {
            self.put_objects(host, Slot::Current);
        }
        self.put_baseline(host);
        self.initialized = true;
        debug!(
            record = %host.class_name(),
            epoch = self.epoch,
            objects = self.objects.len(),
            "Value objects initialized"
        );
        Ok(())
    }

    /// Drops every object and the encoding cache, then initializes a new epoch.
    pub fn re_init_objects(&mut self, host: &mut dyn Host) -> Result<()> {
        self.initialized = false;
        self.objects.clear();
        self.classes.clear();
        self.json.clear();
        self.epoch += 1;
        info!(record = %host.class_name(), epoch = self.epoch, "Reinitializing value objects");
        self.init_objects(host, Slot::Current)
    }

    fn create_objects(&mut self, host: &dyn Host) -> Result<()> {
        for (attribute, declaration) in self.declarations(host).iter() {
            match self.create_object(declaration, host)? {
                Some((object, class)) => {
                    self.objects.insert(attribute.to_string(), object);
                    self.classes.insert(attribute.to_string(), class);
                }
                None => {
                    debug!(record = %host.class_name(), attribute, "Dependent class not available yet");
                }
            }
        }
        Ok(())
    }

    fn create_object(
        &self,
        declaration: &Declaration,
        host: &dyn Host,
    ) -> Result<Option<(SharedObject, String)>> {
        match declaration {
            Declaration::Shared(object) => {
                let class = object.borrow().class_name().to_string();
                Ok(Some((self.adopt(object.clone()), class)))
            }
            Declaration::Dependent(dependent) => {
                if !dependent.can_get(host) {
                    return Ok(None);
                }
                let class = dependent.class_name(host);
                let object = self.instantiate(&class)?;
                Ok(Some((object, class)))
            }
            Declaration::Class(class) => {
                let object = self.instantiate(class)?;
                Ok(Some((object, class.clone())))
            }
        }
    }

    fn instantiate(&self, class: &str) -> Result<SharedObject> {
        let object = self.registry.instantiate(class)?;
        Ok(self.adopt(object))
    }

    /// Hands the configured separator to the object for its nested error keys.
    fn adopt(&self, object: SharedObject) -> SharedObject {
        object
            .borrow_mut()
            .set_separator(&self.config.attribute_separator);
        object
    }

    /// Re-resolves dependent declarations. With `only_changed`, only those whose
    /// source attribute changed are looked at. Returns the replaced attributes.
    ///
    /// A dropped object no longer backs its column, so the current slot is reset
    /// to `null`.
    fn sync_dependents(&mut self, host: &mut dyn Host, only_changed: bool) -> Result<Vec<String>> {
        let mut replaced = Vec::new();
        for (attribute, declaration) in self.declarations(host).iter() {
            let Declaration::Dependent(dependent) = declaration else {
                continue;
            };
            if only_changed && !dependent.is_changed(host) {
                continue;
            }
            if !dependent.can_get(host) {
                if self.objects.remove(attribute).is_some() {
                    self.classes.remove(attribute);
                    self.json.remove(attribute);
                    host.set_attribute(attribute, AttributeValue::Json(Value::Null));
                    debug!(record = %host.class_name(), attribute, "Dependent object dropped");
                }
                continue;
            }
            let class = dependent.class_name(host);
            if self.objects.contains_key(attribute) && self.class_of(attribute) == Some(class.as_str()) {
                continue;
            }
            let object = self.instantiate(&class)?;
            info!(record = %host.class_name(), attribute, %class, "Dependent class resolved");
            self.objects.insert(attribute.to_string(), object);
            self.classes.insert(attribute.to_string(), class);
            self.json.remove(attribute);
            replaced.push(attribute.to_string());
        }
        Ok(replaced)
    }

    /// Replaces dependent objects whose class changed with the source attribute.
    /// Replaced objects are written into their current slot.
    pub fn refresh_dependents(&mut self, host: &mut dyn Host) -> Result<()> {
        for attribute in self.sync_dependents(host, true)? {
            if let Some(object) = self.objects.get(&attribute) {
                host.set_attribute(&attribute, AttributeValue::Object(object.clone()));
            }
        }
        Ok(())
    }

    /// Loads every object from the encoded text in its column.
    ///
    /// Each object takes a baseline snapshot afterwards, then is written into its
    /// current slot and (for a persisted host) its old slot.
    pub fn after_find(&mut self, host: &mut dyn Host) -> Result<()> {
        self.init_objects(host, Slot::Old)?;
        self.sync_dependents(host, false)?;
        for (attribute, object) in self.objects.iter() {
            self.fill_object(attribute, object, host)?;
            let snapshot = object.borrow().attributes();
            object.borrow_mut().set_old_attributes(snapshot);
        }
        self.json.clear();
        self.put_objects(host, Slot::Current);
        self.put_baseline(host);
        debug!(record = %host.class_name(), objects = self.objects.len(), "Value objects loaded");
        Ok(())
    }

    fn fill_object(&self, attribute: &str, object: &SharedObject, host: &dyn Host) -> Result<()> {
        let text = match host.attribute(attribute).and_then(AttributeValue::as_str) {
            Some(text) if !text.is_empty() => text,
            _ => return Ok(()),
        };
        let decoded = self
            .codec
            .decode(text)
            .map_err(|source| ValueObjectError::mapping(attribute, source))?;
        if decoded.is_null() {
            return Ok(());
        }
        let values = into_attributes(decoded).ok_or_else(|| {
            ValueObjectError::mapping(attribute, "stored value is not a mapping or a list")
        })?;
        object
            .borrow_mut()
            .set_attributes(values)
            .map_err(|source| ValueObjectError::mapping(attribute, source))
    }

    /// Writes the encoded text of every object into its current slot.
    pub fn put_json(&mut self, host: &mut dyn Host) -> Result<()> {
        for attribute in self.declarations(host).names() {
            let Some(object) = self.objects.get(attribute) else {
                continue;
            };
            let text = match self.json.get(attribute) {
                Some(text) => text.clone(),
                None => {
                    let text = self.codec.encode(&object.borrow().to_json())?;
                    self.json.insert(attribute.to_string(), text.clone());
                    text
                }
            };
            host.set_attribute(attribute, AttributeValue::Json(Value::String(text)));
        }
        Ok(())
    }

    /// Writes every object into the given slot.
    pub fn put_objects(&self, host: &mut dyn Host, slot: Slot) {
        for attribute in self.declarations(host).names() {
            let Some(object) = self.objects.get(attribute) else {
                continue;
            };
            let value = AttributeValue::Object(object.clone());
            match slot {
                Slot::Current => host.set_attribute(attribute, value),
                Slot::Old => host.set_old_attribute(attribute, value),
            }
        }
    }

    fn put_baseline(&self, host: &mut dyn Host) {
        if !host.is_new_record() {
            self.put_objects(host, Slot::Old);
        }
    }

    /// Routes every entry of `values`. An empty mapping is a no-op.
    pub fn set_attributes(&mut self, host: &mut dyn Host, values: &Attributes) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        self.prepare_routing(host)?;
        for (name, value) in values {
            self.route(host, name, value.clone())?;
        }
        Ok(())
    }

    /// Routes one assignment into the sub-object named by the first path segment.
    ///
    /// `address.city = "Oslo"` applies `{"city": "Oslo"}` to the `address` object.
    /// A plain name with a scalar value is left to the host.
    pub fn set_attribute(&mut self, host: &mut dyn Host, name: &str, value: &Value) -> Result<()> {
        self.prepare_routing(host)?;
        self.route(host, name, value.clone())
    }

    fn prepare_routing(&mut self, host: &mut dyn Host) -> Result<()> {
        self.init_objects(host, Slot::Old)?;
        if self.config.refresh_dependents {
            self.refresh_dependents(host)?;
        }
        Ok(())
    }

    fn route(&mut self, host: &mut dyn Host, name: &str, value: Value) -> Result<()> {
        let separator = self.config.attribute_separator.as_str();
        if path::is_simple(name, separator) && !is_structured(&value) {
            return Ok(());
        }
        let segments = path::split(name, separator);
        let Some((head, rest)) = segments.split_first() else {
            return Ok(());
        };
        if !self.declarations(host).contains(head) {
            debug!(record = %host.class_name(), attribute = %name, "Not a value object attribute");
            return Ok(());
        }

        let values = into_attributes(path::nest(rest, value))
            .ok_or_else(|| ValueObjectError::assign(*head, "expected a mapping"))?;
        let object = self.object(head)?;
        object.borrow_mut().set_attributes(values)?;
        self.json.remove(*head);
        host.set_attribute(head, AttributeValue::Object(object));
        debug!(record = %host.class_name(), attribute = %name, "Routed into value object");
        Ok(())
    }

    /// Validates every object. Failures are merged into the host under
    /// `attribute<separator>field` keys. Returns `true` when all objects are valid.
    pub fn validate_objects(&mut self, host: &mut dyn Host) -> bool {
        let mut valid = true;
        for attribute in self.declarations(host).names() {
            let Some(object) = self.objects.get(attribute) else {
                continue;
            };
            let object_valid = object.borrow_mut().validate();
            if object_valid {
                continue;
            }
            let mut errors = ErrorBag::new();
            errors.merge_prefixed(attribute, &self.config.attribute_separator, object.borrow().errors());
            warn!(record = %host.class_name(), attribute, errors = errors.len(), "Value object is invalid");
            host.add_errors(&errors);
            host.set_attribute(attribute, AttributeValue::Object(object.clone()));
            valid = false;
        }
        valid
    }
}

impl<C: Codec + 'static> Behavior for ValueObjectsBehavior<C> {
    fn handle(&mut self, event: &RecordEvent<'_>, host: &mut dyn Host) -> Result<()> {
        match event {
            RecordEvent::Init if self.config.initialize_on_init => {
                self.init_objects(host, Slot::Current)
            }
            RecordEvent::AfterFind => self.after_find(host),
            RecordEvent::Reinitialize => self.re_init_objects(host),
            RecordEvent::BeforeValidate | RecordEvent::BeforeInsert | RecordEvent::BeforeUpdate => {
                self.init_objects(host, Slot::Current)?;
                self.put_json(host)
            }
            RecordEvent::AfterValidate => {
                self.put_objects(host, Slot::Current);
                self.validate_objects(host);
                self.json.clear();
                Ok(())
            }
            RecordEvent::AfterInsert | RecordEvent::AfterUpdate => {
                self.put_objects(host, Slot::Old);
                self.put_objects(host, Slot::Current);
                self.json.clear();
                Ok(())
            }
            RecordEvent::AfterSetAttributes { values, .. } => self.set_attributes(host, values),
            RecordEvent::AfterSetAttribute { name, value } => self.set_attribute(host, name, value),
            _ => Ok(()),
        }
    }

    fn claims_attribute(&self, name: &str, host: &dyn Host) -> bool {
        let head = path::head(name, &self.config.attribute_separator);
        self.declarations(host).contains(head)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependent::DependentProperty;
    use crate::list::ValueObjectList;
    use crate::mock::{HostCall, MockHost};
    use crate::object::{Model, Validate};
    use crate::attribute::share;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Geo {
        lat: f64,
        lng: f64,
    }

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Address {
        city: String,
        zip: String,
        geo: Geo,
    }

    impl Validate for Address {
        fn validate(&self, errors: &mut ErrorBag) {
            if self.city.is_empty() {
                errors.add("city", "City cannot be blank.");
            }
        }
    }

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Card {
        number: String,
    }

    impl Validate for Card {}

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Invoice {
        email: String,
    }

    impl Validate for Invoice {}

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Label {
        text: String,
    }

    impl Validate for Label {}

    fn registry() -> Rc<Registry> {
        let mut registry = Registry::new();
        registry
            .register_model::<Address>()
            .register_model::<Card>()
            .register_model::<Invoice>();
        Rc::new(registry)
    }

    fn address_host() -> MockHost {
        MockHost::new("Customer").with_declarations(Declarations::new().class("address", "Address"))
    }

    fn payment_host() -> MockHost {
        let payment = DependentProperty::builder("method")
            .getter(|host| match host.attribute("method").and_then(AttributeValue::as_str) {
                Some("invoice") => "Invoice".into(),
                _ => "Card".into(),
            })
            .build()
            .unwrap();
        MockHost::new("Order").with_declarations(Declarations::new().dependent("payment", payment))
    }

    fn city(behavior: &mut ValueObjectsBehavior) -> String {
        behavior
            .with_object::<Model<Address>, _>("address", |address| address.data().city.clone())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_init_on_persisted_host_sets_object_as_baseline() {
        let mut host = address_host().persisted();
        let mut behavior = ValueObjectsBehavior::new(registry());

        behavior.init_objects(&mut host, Slot::Current).unwrap();

        let object = behavior.object("address").unwrap();
        assert_eq!(host.attribute("address"), Some(&AttributeValue::Object(object.clone())));
        assert_eq!(host.old_attribute("address"), Some(&AttributeValue::Object(object)));
        assert!(!host.is_attribute_changed("address"));
    }

    #[test]
    fn test_init_on_new_host_leaves_baseline_empty() {
        let mut host = address_host();
        let mut behavior = ValueObjectsBehavior::new(registry());

        behavior.init_objects(&mut host, Slot::Current).unwrap();
        assert!(host.old_attribute("address").is_none());

        let first = behavior.object("address").unwrap();
        behavior.init_objects(&mut host, Slot::Current).unwrap();
        assert!(Rc::ptr_eq(&first, &behavior.object("address").unwrap()));
    }

    #[test]
    fn test_put_json_is_idempotent_and_uses_cache() {
        let mut host = address_host();
        let mut behavior = ValueObjectsBehavior::new(registry());
        behavior.init_objects(&mut host, Slot::Current).unwrap();

        behavior.put_json(&mut host).unwrap();
        let first = host.attribute("address").cloned();
        behavior.put_json(&mut host).unwrap();

        assert_eq!(host.attribute("address").cloned(), first);
        let cached = behavior.json("address").unwrap().to_string();
        assert_eq!(host.attribute("address").and_then(AttributeValue::as_str), Some(cached.as_str()));
    }

    #[test]
    fn test_dotted_scalar_sets_only_that_field() {
        let mut host = address_host();
        let mut behavior = ValueObjectsBehavior::new(registry());
        behavior.init_objects(&mut host, Slot::Current).unwrap();
        behavior
            .set_attribute(&mut host, "address", &json!({"city": "Oslo", "zip": "01500"}))
            .unwrap();

        behavior.set_attribute(&mut host, "address.city", &json!("Bergen")).unwrap();

        behavior
            .with_object::<Model<Address>, _>("address", |address| {
                assert_eq!(address.data().city, "Bergen");
                assert_eq!(address.data().zip, "01500");
            })
            .unwrap();
    }

    #[test]
    fn test_dotted_structured_value_is_nested() {
        let mut host = address_host();
        let mut behavior = ValueObjectsBehavior::new(registry());
        behavior
            .set_attribute(&mut host, "address.geo", &json!({"lat": 1.5}))
            .unwrap();
        behavior.set_attribute(&mut host, "address.geo.lng", &json!(2.5)).unwrap();

        let geo = behavior
            .with_object::<Model<Address>, _>("address", |address| address.data().geo.clone())
            .unwrap()
            .unwrap();
        assert_eq!(geo, Geo { lat: 1.5, lng: 2.5 });
    }

    #[test]
    fn test_top_level_scalar_is_ignored_and_structured_is_routed() {
        let mut host = address_host();
        let mut behavior = ValueObjectsBehavior::new(registry());
        behavior.init_objects(&mut host, Slot::Current).unwrap();
        host.clear_calls();

        behavior.set_attribute(&mut host, "address", &json!("Oslo")).unwrap();
        assert!(host.calls().is_empty());
        assert_eq!(city(&mut behavior), "");

        behavior.set_attribute(&mut host, "address", &json!({"city": "Oslo"})).unwrap();
        assert_eq!(city(&mut behavior), "Oslo");
        assert_eq!(host.calls(), [HostCall::SetAttribute("address".into())]);
    }

    #[test]
    fn test_undeclared_head_is_ignored_and_empty_bulk_is_noop() {
        let mut host = address_host();
        let mut behavior = ValueObjectsBehavior::new(registry());

        behavior.set_attributes(&mut host, &Attributes::new()).unwrap();
        assert!(!behavior.is_initialized());

        let values = json!({"profile.nick": "ada", "name": "Ada"});
        behavior.set_attributes(&mut host, values.as_object().unwrap()).unwrap();
        assert!(behavior.is_initialized());
        assert!(host.attribute("profile").is_none());
    }

    #[test]
    fn test_routing_drops_cached_json() {
        let mut host = address_host();
        let mut behavior = ValueObjectsBehavior::new(registry());
        behavior.init_objects(&mut host, Slot::Current).unwrap();
        behavior.put_json(&mut host).unwrap();
        assert!(behavior.json("address").is_some());

        behavior.set_attribute(&mut host, "address.city", &json!("Oslo")).unwrap();
        assert!(behavior.json("address").is_none());

        behavior.put_json(&mut host).unwrap();
        assert!(behavior.json("address").unwrap().contains("Oslo"));
    }

    #[test]
    fn test_after_find_decodes_column_and_snapshots() {
        let mut host = address_host().persisted();
        host.set_attribute(
            "address",
            AttributeValue::Json(json!(r#"{"city":"Oslo","zip":"01500"}"#)),
        );
        let mut behavior = ValueObjectsBehavior::new(registry());

        behavior.after_find(&mut host).unwrap();

        assert_eq!(city(&mut behavior), "Oslo");
        assert!(behavior.changed_objects().is_empty());
        assert!(!host.is_attribute_changed("address"));
        assert!(behavior.json("address").is_none());

        behavior.set_attribute(&mut host, "address.city", &json!("Bergen")).unwrap();
        assert_eq!(behavior.changed_objects(), ["address"]);
    }

    #[test]
    fn test_malformed_column_is_mapping_error() {
        let mut host = address_host().persisted();
        host.set_attribute("address", AttributeValue::Json(json!("{\"city\": ")));
        let mut behavior = ValueObjectsBehavior::new(registry());

        let err = behavior.after_find(&mut host).unwrap_err();
        assert!(err.is_mapping());

        let mut host = address_host().persisted();
        host.set_attribute("address", AttributeValue::Json(json!(r#"{"city": 5}"#)));
        let mut behavior = ValueObjectsBehavior::new(registry());
        assert!(behavior.after_find(&mut host).unwrap_err().is_mapping());
    }

    #[test]
    fn test_validation_errors_are_prefixed_and_object_written_back() {
        let mut host = address_host();
        let mut behavior = ValueObjectsBehavior::new(registry());
        behavior.init_objects(&mut host, Slot::Current).unwrap();
        behavior.put_json(&mut host).unwrap();

        assert!(!behavior.validate_objects(&mut host));

        assert_eq!(
            host.errors().get("address.city"),
            Some(&["City cannot be blank.".to_string()][..])
        );
        let object = behavior.object("address").unwrap();
        assert_eq!(host.attribute("address"), Some(&AttributeValue::Object(object)));
    }

    #[test]
    fn test_reinit_builds_fresh_objects() {
        let mut host = address_host().persisted();
        let mut behavior = ValueObjectsBehavior::new(registry());
        behavior.init_objects(&mut host, Slot::Current).unwrap();
        behavior.put_json(&mut host).unwrap();
        let before = behavior.object("address").unwrap();

        behavior.re_init_objects(&mut host).unwrap();

        let after = behavior.object("address").unwrap();
        assert!(!Rc::ptr_eq(&before, &after));
        assert!(behavior.json("address").is_none());
        assert_eq!(behavior.epoch(), 1);
    }

    #[test]
    fn test_dependent_without_source_is_not_created() {
        let mut host = payment_host();
        let mut behavior = ValueObjectsBehavior::new(registry());
        behavior.init_objects(&mut host, Slot::Current).unwrap();

        let err = behavior.object("payment").unwrap_err();
        assert!(matches!(err, ValueObjectError::NotCreated(name) if name == "payment"));

        let err = behavior
            .set_attribute(&mut host, "payment.number", &json!("4111"))
            .unwrap_err();
        assert!(matches!(err, ValueObjectError::NotCreated(_)));
    }

    #[test]
    fn test_dependent_resolves_class_from_host() {
        let mut host = payment_host();
        host.set_attribute("method", AttributeValue::Json(json!("invoice")));
        let mut behavior = ValueObjectsBehavior::new(registry());
        behavior.init_objects(&mut host, Slot::Current).unwrap();

        assert_eq!(behavior.class_of("payment"), Some("Invoice"));
    }

    #[test]
    fn test_refresh_dependents_follows_source_changes() {
        let mut host = payment_host();
        let mut behavior = ValueObjectsBehavior::new(registry())
            .with_config(BehaviorConfig::default().with_refresh_dependents(true));
        behavior.init_objects(&mut host, Slot::Current).unwrap();

        host.set_attribute("method", AttributeValue::Json(json!("card")));
        behavior.set_attribute(&mut host, "payment.number", &json!("4111")).unwrap();
        assert_eq!(behavior.class_of("payment"), Some("Card"));
        let card = behavior.object("payment").unwrap();

        behavior.set_attribute(&mut host, "payment.number", &json!("4242")).unwrap();
        assert!(Rc::ptr_eq(&card, &behavior.object("payment").unwrap()));

        host.set_attribute("method", AttributeValue::Json(json!("invoice")));
        behavior.set_attribute(&mut host, "payment.email", &json!("ap@example.com")).unwrap();
        assert_eq!(behavior.class_of("payment"), Some("Invoice"));
        assert_eq!(
            behavior.object("payment").unwrap().borrow().to_json(),
            json!({"email": "ap@example.com"})
        );
    }

    #[test]
    fn test_shared_list_is_the_same_instance() {
        let tags = share(ValueObjectList::from_items(vec![Label { text: "vip".into() }]));
        let declarations = Declarations::new().shared("tags", tags.clone());
        let mut first = MockHost::new("Customer").with_declarations(declarations.clone());
        let mut second = MockHost::new("Customer").with_declarations(declarations);
        let mut first_behavior = ValueObjectsBehavior::new(registry());
        let mut second_behavior = ValueObjectsBehavior::new(registry());

        first_behavior.init_objects(&mut first, Slot::Current).unwrap();
        second_behavior.init_objects(&mut second, Slot::Current).unwrap();

        assert!(Rc::ptr_eq(&tags, &first_behavior.object("tags").unwrap()));
        assert!(Rc::ptr_eq(&tags, &second_behavior.object("tags").unwrap()));

        first_behavior.set_attribute(&mut first, "tags.1.text", &json!("new")).unwrap();
        assert_eq!(tags.borrow().to_json(), json!([{"text": "vip"}, {"text": "new"}]));
    }

    #[test]
    fn test_custom_separator() {
        let mut host = address_host();
        let mut behavior = ValueObjectsBehavior::new(registry())
            .with_config(BehaviorConfig::default().with_separator("/"));
        behavior.set_attribute(&mut host, "address/city", &json!("Oslo")).unwrap();
        assert_eq!(city(&mut behavior), "Oslo");

        behavior.set_attribute(&mut host, "address.city", &json!("Bergen")).unwrap();
        assert_eq!(city(&mut behavior), "Oslo");

        behavior.set_attribute(&mut host, "address/city", &json!("")).unwrap();
        assert!(!behavior.validate_objects(&mut host));
        assert!(host.errors().get("address/city").is_some());
    }

    #[test]
    fn test_dropped_dependent_clears_current_slot() {
        let mut host = payment_host();
        let mut behavior = ValueObjectsBehavior::new(registry())
            .with_config(BehaviorConfig::default().with_refresh_dependents(true));
        host.set_attribute("method", AttributeValue::Json(json!("card")));
        behavior.set_attribute(&mut host, "payment.number", &json!("4111")).unwrap();
        assert!(matches!(host.attribute("payment"), Some(AttributeValue::Object(_))));

        host.set_attribute("method", AttributeValue::Json(json!("")));
        behavior.refresh_dependents(&mut host).unwrap();

        assert!(matches!(behavior.object("payment"), Err(ValueObjectError::NotCreated(_))));
        assert_eq!(behavior.class_of("payment"), None);
        assert_eq!(host.attribute("payment"), Some(&AttributeValue::Json(Value::Null)));

        behavior.put_json(&mut host).unwrap();
        assert_eq!(host.attribute("payment"), Some(&AttributeValue::Json(Value::Null)));
    }

    #[test]
    fn test_list_errors_use_configured_separator() {
        let places = share(ValueObjectList::from_items(vec![Address::default()]));
        let mut host = MockHost::new("Trip").with_declarations(Declarations::new().shared("places", places));
        let mut behavior = ValueObjectsBehavior::new(registry())
            .with_config(BehaviorConfig::default().with_separator("/"));
        behavior.init_objects(&mut host, Slot::Current).unwrap();

        assert!(!behavior.validate_objects(&mut host));
        assert!(host.errors().get("places/0/city").is_some());
        assert!(host.errors().get("places/0.city").is_none());
    }

    #[test]
    fn test_claims_only_declared_heads() {
        let host = address_host();
        let behavior = ValueObjectsBehavior::new(registry());
        assert!(behavior.claims_attribute("address.city", &host));
        assert!(!behavior.claims_attribute("profile.nick", &host));
    }
}

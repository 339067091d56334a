//! The car asset contract
//!
//! [`AssetContract`] holds no state between invocations; everything it
//! knows about the ledger it reads through the [`TransactionContext`] of the
//! current call. Read-modify-write operations write back with the version
//! they read, so a concurrent write to the same key fails the later
//! transaction with `VersionConflict` instead of being silently overwritten.

use chrono::Datelike;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::asset::{
    parse_mileage, parse_price, parse_year, seed_cars, Car, HistoryEntry, QueryResult,
    DEFAULT_STATUS, DOC_TYPE,
};
use crate::collector::{collect_history, collect_states};
use crate::config::ContractConfig;
use crate::error::{LedgerError, Result};
use crate::events::{CarCreated, CarOwnerChanged, LedgerEvent};
use crate::storage::Selector;
use crate::transaction::TransactionContext;

/// Arguments of `createCar`
///
/// Numeric fields are free text and parsed leniently; see
/// [`parse_year`], [`parse_mileage`] and [`parse_price`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCar {
    pub key: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub owner: String,
    pub year: Option<String>,
    pub mileage: Option<String>,
    pub price: Option<String>,
}

impl NewCar {
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("carNumber", &self.key),
            ("make", &self.make),
            ("model", &self.model),
            ("color", &self.color),
            ("owner", &self.owner),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Asset contract
#[derive(Debug, Clone, Default)]
pub struct AssetContract {
    config: ContractConfig,
}

impl AssetContract {
    /// Contract with the default `CAR` key layout
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ContractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Write the five seed cars to `CAR0`..`CAR4`, overwriting whatever is
    /// there
    pub fn init_ledger(&self, ctx: &TransactionContext<'_>) -> Result<()> {
        tracing::debug!(tx_id = ctx.tx_id(), "initLedger: start");
        for (index, car) in seed_cars().into_iter().enumerate() {
            let key = self.config.key_for(index);
            ctx.put_state(&key, car.to_bytes()?)?;
            tracing::debug!(key = %key, make = %car.make, model = %car.model, "seeded car");
        }
        tracing::debug!(tx_id = ctx.tx_id(), "initLedger: end");
        Ok(())
    }

    /// The stored record under `key`, verbatim
    pub fn query_car(&self, ctx: &TransactionContext<'_>, key: &str) -> Result<String> {
        let stored = ctx
            .get_state(key)?
            .filter(|v| !v.value.is_empty())
            .ok_or_else(|| LedgerError::not_found(key))?;
        Ok(String::from_utf8_lossy(&stored.value).into_owned())
    }

    /// Create a car under a fresh key and emit `CarCreated`
    pub fn create_car(&self, ctx: &TransactionContext<'_>, new_car: NewCar) -> Result<Car> {
        tracing::debug!(key = %new_car.key, tx_id = ctx.tx_id(), "createCar: start");

        let missing = new_car.missing_fields();
        if !missing.is_empty() {
            return Err(LedgerError::validation(format!(
                "Missing required car information: {}",
                missing.join(", ")
            )));
        }

        // An empty value counts as absent and is overwritten at its version.
        let expected = match ctx.get_state(&new_car.key)? {
            Some(existing) if !existing.value.is_empty() => {
                return Err(LedgerError::Conflict { key: new_car.key });
            }
            existing => existing.map(|v| v.version),
        };

        let now = ctx.tx().iso_timestamp();
        let current_year = i64::from(ctx.tx().timestamp().year());
        let car = Car {
            color: new_car.color,
            doc_type: DOC_TYPE.to_string(),
            make: new_car.make,
            model: new_car.model,
            owner: new_car.owner,
            year: parse_year(new_car.year.as_deref(), current_year),
            mileage: parse_mileage(new_car.mileage.as_deref()),
            price: parse_price(new_car.price.as_deref()),
            status: DEFAULT_STATUS.to_string(),
            created_at: Some(now.clone()),
            last_modified: Some(now),
            extra: Map::new(),
        };

        ctx.put_state_if_version(&new_car.key, car.to_bytes()?, expected)?;
        ctx.set_event(LedgerEvent::CarCreated(CarCreated {
            car_number: new_car.key.clone(),
            owner: car.owner.clone(),
            make: car.make.clone(),
            model: car.model.clone(),
        }));

        tracing::debug!(key = %new_car.key, "createCar: end");
        Ok(car)
    }

    /// Every car in the configured key range, in key byte order
    pub fn query_all_cars(&self, ctx: &TransactionContext<'_>) -> Result<Vec<QueryResult>> {
        let iter = ctx.state_by_range(&self.config.scan_start, &self.config.scan_end)?;
        let results = collect_states(iter)?;
        tracing::debug!(count = results.len(), "queryAllCars");
        Ok(results)
    }

    /// Transfer a car and emit `CarOwnerChanged`
    pub fn change_car_owner(
        &self,
        ctx: &TransactionContext<'_>,
        key: &str,
        new_owner: &str,
    ) -> Result<Car> {
        tracing::debug!(key, new_owner, tx_id = ctx.tx_id(), "changeCarOwner: start");

        if key.is_empty() || new_owner.is_empty() {
            return Err(LedgerError::validation(
                "Car number and new owner are required",
            ));
        }

        let (mut car, version) = self.read_car(ctx, key)?;
        let previous_owner = std::mem::replace(&mut car.owner, new_owner.to_string());
        let now = ctx.tx().iso_timestamp();
        car.last_modified = Some(now.clone());

        ctx.put_state_if_version(key, car.to_bytes()?, Some(version))?;
        ctx.set_event(LedgerEvent::CarOwnerChanged(CarOwnerChanged {
            car_number: key.to_string(),
            previous_owner,
            new_owner: new_owner.to_string(),
            timestamp: now,
        }));

        tracing::debug!(key, "changeCarOwner: end");
        Ok(car)
    }

    /// Merge `color`, `mileage`, `price` and `status` from a JSON object;
    /// any other field in the payload is ignored
    pub fn update_car_details(
        &self,
        ctx: &TransactionContext<'_>,
        key: &str,
        updates: &str,
    ) -> Result<Car> {
        tracing::debug!(key, tx_id = ctx.tx_id(), "updateCarDetails: start");

        let (mut car, version) = self.read_car(ctx, key)?;

        let updates: Value = serde_json::from_str(updates).map_err(|e| {
            LedgerError::MalformedInput {
                reason: format!("updates are not valid JSON: {}", e),
            }
        })?;
        let updates = updates.as_object().ok_or_else(|| LedgerError::MalformedInput {
            reason: "updates must be a JSON object".to_string(),
        })?;

        apply_updates(&mut car, updates)?;
        car.last_modified = Some(ctx.tx().iso_timestamp());

        ctx.put_state_if_version(key, car.to_bytes()?, Some(version))?;

        tracing::debug!(key, "updateCarDetails: end");
        Ok(car)
    }

    /// Cars whose owner is exactly `owner`
    pub fn query_cars_by_owner(
        &self,
        ctx: &TransactionContext<'_>,
        owner: &str,
    ) -> Result<Vec<QueryResult>> {
        self.query_by_field(ctx, "owner", owner)
    }

    /// Cars whose make is exactly `make`
    pub fn query_cars_by_make(
        &self,
        ctx: &TransactionContext<'_>,
        make: &str,
    ) -> Result<Vec<QueryResult>> {
        self.query_by_field(ctx, "make", make)
    }

    /// Every committed version of `key`, oldest first
    pub fn get_car_history(
        &self,
        ctx: &TransactionContext<'_>,
        key: &str,
    ) -> Result<Vec<HistoryEntry>> {
        let history = collect_history(ctx.history_for_key(key)?)?;
        tracing::debug!(key, versions = history.len(), "getCarHistory");
        Ok(history)
    }

    /// Run an operation by name with text arguments and return its JSON
    /// result
    ///
    /// This is the surface the hosting platform calls. `initLedger` returns
    /// an empty string; every other operation returns JSON text.
    pub fn invoke(
        &self,
        ctx: &TransactionContext<'_>,
        function: &str,
        args: &[String],
    ) -> Result<String> {
        match function {
            "initLedger" => {
                expect_args(function, args, 0, 0)?;
                self.init_ledger(ctx)?;
                Ok(String::new())
            }
            "queryCar" => {
                expect_args(function, args, 1, 1)?;
                self.query_car(ctx, &args[0])
            }
            "createCar" => {
                expect_args(function, args, 5, 8)?;
                let car = self.create_car(
                    ctx,
                    NewCar {
                        key: args[0].clone(),
                        make: args[1].clone(),
                        model: args[2].clone(),
                        color: args[3].clone(),
                        owner: args[4].clone(),
                        year: args.get(5).cloned(),
                        mileage: args.get(6).cloned(),
                        price: args.get(7).cloned(),
                    },
                )?;
                to_json(&car)
            }
            "queryAllCars" => {
                expect_args(function, args, 0, 0)?;
                to_json(&self.query_all_cars(ctx)?)
            }
            "changeCarOwner" => {
                expect_args(function, args, 2, 2)?;
                to_json(&self.change_car_owner(ctx, &args[0], &args[1])?)
            }
            "updateCarDetails" => {
                expect_args(function, args, 2, 2)?;
                to_json(&self.update_car_details(ctx, &args[0], &args[1])?)
            }
            "queryCarsByOwner" => {
                expect_args(function, args, 1, 1)?;
                to_json(&self.query_cars_by_owner(ctx, &args[0])?)
            }
            "queryCarsByMake" => {
                expect_args(function, args, 1, 1)?;
                to_json(&self.query_cars_by_make(ctx, &args[0])?)
            }
            "getCarHistory" => {
                expect_args(function, args, 1, 1)?;
                to_json(&self.get_car_history(ctx, &args[0])?)
            }
            other => Err(LedgerError::UnknownFunction {
                name: other.to_string(),
            }),
        }
    }

    fn read_car(&self, ctx: &TransactionContext<'_>, key: &str) -> Result<(Car, u64)> {
        let stored = ctx
            .get_state(key)?
            .filter(|v| !v.value.is_empty())
            .ok_or_else(|| LedgerError::not_found(key))?;
        Ok((Car::from_bytes(key, &stored.value)?, stored.version))
    }

    fn query_by_field(
        &self,
        ctx: &TransactionContext<'_>,
        field: &str,
        value: &str,
    ) -> Result<Vec<QueryResult>> {
        let selector = Selector::new().equals("docType", DOC_TYPE).equals(field, value);
        let results = collect_states(ctx.query_result(&selector)?)?;
        tracing::debug!(field, value, count = results.len(), "query by field");
        Ok(results)
    }
}

/// Names of the operations `invoke` accepts
pub const FUNCTIONS: [&str; 9] = [
    "initLedger",
    "queryCar",
    "createCar",
    "queryAllCars",
    "changeCarOwner",
    "updateCarDetails",
    "queryCarsByOwner",
    "queryCarsByMake",
    "getCarHistory",
];

fn expect_args(function: &str, args: &[String], min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{}-{}", min, max)
    };
    Err(LedgerError::InvalidArguments {
        function: function.to_string(),
        expected,
        actual: args.len(),
    })
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn apply_updates(car: &mut Car, updates: &Map<String, Value>) -> Result<()> {
    // `null` leaves the field as it was
    let field = |name: &str| updates.get(name).filter(|v| !v.is_null());

    if let Some(value) = field("color") {
        car.color = string_field("color", value)?;
    }
    if let Some(value) = field("mileage") {
        car.mileage = mileage_field(value)?;
    }
    if let Some(value) = field("price") {
        car.price = price_field(value)?;
    }
    if let Some(value) = field("status") {
        car.status = string_field("status", value)?;
    }
    Ok(())
}

fn malformed(field: &str, expected: &str, value: &Value) -> LedgerError {
    LedgerError::MalformedInput {
        reason: format!("'{}' must be {}, got {}", field, expected, value),
    }
}

fn string_field(field: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| malformed(field, "a string", value))
}

fn mileage_field(value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole_number)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    };
    parsed.ok_or_else(|| malformed("mileage", "a non-negative integer", value))
}

/// `16000.0` and `1.6e4` are whole numbers; `-1.0` and `2.5` are not
fn whole_number(n: f64) -> Option<u64> {
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64).then(|| n as u64)
}

fn price_field(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|p| p.is_finite())
        .ok_or_else(|| malformed("price", "a number", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, EventLog};
    use crate::storage::{AssetStore, InMemoryStore};
    use crate::transaction::TxInfo;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    struct Fixture {
        store: InMemoryStore,
        events: EventLog,
        contract: AssetContract,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
                events: EventLog::new(),
                contract: AssetContract::new(),
            }
        }

        fn ctx(&self, tx_id: &str) -> TransactionContext<'_> {
            let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
            TransactionContext::new(&self.store, &self.events, TxInfo::new(tx_id, at))
        }

        fn invoke(&self, function: &str, args: &[&str]) -> Result<String> {
            let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
            self.contract.invoke(&self.ctx("tx"), function, &args)
        }
    }

    fn prius() -> NewCar {
        NewCar {
            key: "CAR10".to_string(),
            make: "Toyota".to_string(),
            model: "Prius".to_string(),
            color: "blue".to_string(),
            owner: "Tomoko".to_string(),
            ..NewCar::default()
        }
    }

    #[test]
    fn test_create_car_defaults() {
        let f = Fixture::new();
        let car = f.contract.create_car(&f.ctx("tx-1"), prius()).unwrap();

        assert_eq!(car.year, 2024);
        assert_eq!(car.mileage, 0);
        assert_eq!(car.price, 0.0);
        assert_eq!(car.status, "available");
        assert_eq!(car.doc_type, "car");
        assert_eq!(car.created_at.as_deref(), Some("2024-03-01T12:00:00.000Z"));
        assert_eq!(car.created_at, car.last_modified);

        let event = f.events.last().unwrap();
        assert_eq!(event.name, "CarCreated");
        assert_eq!(event.tx_id, "tx-1");
        assert_eq!(
            event.payload,
            json!({"carNumber": "CAR10", "owner": "Tomoko", "make": "Toyota", "model": "Prius"})
        );
    }

    #[test]
    fn test_create_car_reports_missing_fields() {
        let f = Fixture::new();
        let mut car = prius();
        car.owner.clear();
        car.make.clear();

        let err = f.contract.create_car(&f.ctx("tx"), car).unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
        assert!(err.to_string().contains("make, owner"));
        assert!(f.store.is_empty());
        assert!(f.events.is_empty());
    }

    #[test]
    fn test_create_car_conflict_leaves_value_untouched() {
        let f = Fixture::new();
        f.contract.create_car(&f.ctx("tx-1"), prius()).unwrap();
        let before = f.store.get("CAR10").unwrap().unwrap();

        let mut again = prius();
        again.owner = "Mallory".to_string();
        let err = f.contract.create_car(&f.ctx("tx-2"), again).unwrap_err();

        assert!(matches!(err, LedgerError::Conflict { ref key } if key == "CAR10"));
        assert_eq!(f.store.get("CAR10").unwrap().unwrap(), before);
        assert_eq!(f.events.len(), 1);
    }

    #[test]
    fn test_create_car_over_empty_value() {
        let f = Fixture::new();
        f.store.put(&TxInfo::generate(), "CAR10", Vec::new()).unwrap();

        let car = f.contract.create_car(&f.ctx("tx-1"), prius()).unwrap();
        assert_eq!(car.owner, "Tomoko");

        let stored = f.store.get("CAR10").unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(Car::from_bytes("CAR10", &stored.value).unwrap(), car);
        assert_eq!(f.events.len(), 1);
    }

    #[test]
    fn test_change_owner_touches_only_owner_and_last_modified() {
        let f = Fixture::new();
        f.contract.init_ledger(&f.ctx("tx-0")).unwrap();
        let before: Value = serde_json::from_str(&f.contract.query_car(&f.ctx("q"), "CAR1").unwrap()).unwrap();

        let car = f.contract.change_car_owner(&f.ctx("tx-1"), "CAR1", "Jane").unwrap();
        assert_eq!(car.owner, "Jane");

        let after: Value = serde_json::from_str(&f.contract.query_car(&f.ctx("q"), "CAR1").unwrap()).unwrap();
        let mut expected = before.clone();
        expected["owner"] = json!("Jane");
        expected["lastModified"] = json!("2024-03-01T12:00:00.000Z");
        assert_eq!(after, expected);

        let event = f.events.events_of(EventKind::CarOwnerChanged).pop().unwrap();
        assert_eq!(event.payload["previousOwner"], "Brad");
        assert_eq!(event.payload["newOwner"], "Jane");
        assert_eq!(event.payload["timestamp"], "2024-03-01T12:00:00.000Z");
    }

    #[test]
    fn test_change_owner_validation_and_not_found() {
        let f = Fixture::new();
        assert!(matches!(
            f.contract.change_car_owner(&f.ctx("tx"), "CAR1", ""),
            Err(LedgerError::Validation { .. })
        ));
        assert!(matches!(
            f.contract.change_car_owner(&f.ctx("tx"), "CAR1", "Jane"),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_update_ignores_disallowed_fields() {
        let f = Fixture::new();
        f.contract.init_ledger(&f.ctx("tx-0")).unwrap();

        let car = f
            .contract
            .update_car_details(&f.ctx("tx-1"), "CAR0", r#"{"owner":"X","color":"red","docType":"boat"}"#)
            .unwrap();

        assert_eq!(car.color, "red");
        assert_eq!(car.owner, "Tomoko");
        assert_eq!(car.doc_type, "car");
        assert!(car.last_modified.is_some());
        // No event for detail updates
        assert!(f.events.is_empty());
    }

    #[test]
    fn test_update_numeric_fields() {
        let f = Fixture::new();
        f.contract.init_ledger(&f.ctx("tx-0")).unwrap();

        let car = f
            .contract
            .update_car_details(&f.ctx("tx-1"), "CAR0", r#"{"mileage":16000,"price":"24500.5","status":"sold"}"#)
            .unwrap();
        assert_eq!(car.mileage, 16000);
        assert_eq!(car.price, 24500.5);
        assert_eq!(car.status, "sold");
    }

    #[test]
    fn test_update_accepts_whole_float_mileage() {
        let f = Fixture::new();
        f.contract.init_ledger(&f.ctx("tx-0")).unwrap();

        for (payload, mileage) in [
            (r#"{"mileage":16000.0}"#, 16000),
            (r#"{"mileage":1.6e4}"#, 16000),
            (r#"{"mileage":"17500.0"}"#, 17500),
        ] {
            let car = f.contract.update_car_details(&f.ctx("tx"), "CAR0", payload).unwrap();
            assert_eq!(car.mileage, mileage, "payload {}", payload);
        }

        let err = f
            .contract
            .update_car_details(&f.ctx("tx"), "CAR0", r#"{"mileage":2.5}"#)
            .unwrap_err();
        assert!(matches!(err, LedgerError::MalformedInput { .. }));
    }

    #[test]
    fn test_update_null_leaves_field_unchanged() {
        let f = Fixture::new();
        f.contract.init_ledger(&f.ctx("tx-0")).unwrap();
        let before = f.contract.read_car(&f.ctx("q"), "CAR0").unwrap().0;

        let car = f
            .contract
            .update_car_details(
                &f.ctx("tx-1"),
                "CAR0",
                r#"{"color":null,"mileage":null,"price":null,"status":"sold"}"#,
            )
            .unwrap();
        assert_eq!(car.color, before.color);
        assert_eq!(car.mileage, before.mileage);
        assert_eq!(car.price, before.price);
        assert_eq!(car.status, "sold");
    }

    #[test]
    fn test_update_rejects_malformed_payloads() {
        let f = Fixture::new();
        f.contract.init_ledger(&f.ctx("tx-0")).unwrap();
        let before = f.store.get("CAR0").unwrap().unwrap();

        for payload in ["{not json", "[1,2]", r#"{"mileage":-3}"#, r#"{"color":7}"#] {
            let err = f
                .contract
                .update_car_details(&f.ctx("tx"), "CAR0", payload)
                .unwrap_err();
            assert!(matches!(err, LedgerError::MalformedInput { .. }), "payload {}", payload);
        }
        assert_eq!(f.store.get("CAR0").unwrap().unwrap(), before);
    }

    #[test]
    fn test_update_checks_existence_before_payload() {
        let f = Fixture::new();
        let err = f
            .contract
            .update_car_details(&f.ctx("tx"), "CAR7", "{not json")
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[test]
    fn test_invalid_stored_record() {
        let f = Fixture::new();
        f.store.put(&TxInfo::generate(), "CAR5", b"garbage".to_vec()).unwrap();

        // Verbatim read still works
        assert_eq!(f.contract.query_car(&f.ctx("tx"), "CAR5").unwrap(), "garbage");
        assert!(matches!(
            f.contract.change_car_owner(&f.ctx("tx"), "CAR5", "Jane"),
            Err(LedgerError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_change_owner_of_partial_record() {
        let f = Fixture::new();
        f.store
            .put(
                &TxInfo::generate(),
                "CAR6",
                br#"{"make":"Ford","model":"T","owner":"A","docType":"car"}"#.to_vec(),
            )
            .unwrap();

        let car = f.contract.change_car_owner(&f.ctx("tx-1"), "CAR6", "B").unwrap();
        assert_eq!(car.owner, "B");
        assert_eq!(car.make, "Ford");
        assert_eq!(car.color, "");

        let event = f.events.last().unwrap();
        assert_eq!(event.payload["previousOwner"], "A");
    }

    #[test]
    fn test_queries_by_owner_and_make() {
        let f = Fixture::new();
        f.contract.init_ledger(&f.ctx("tx-0")).unwrap();
        // Same owner, but not a car document
        f.store
            .put(&TxInfo::generate(), "BOAT0", br#"{"docType":"boat","owner":"Brad"}"#.to_vec())
            .unwrap();

        let brad = f.contract.query_cars_by_owner(&f.ctx("q"), "Brad").unwrap();
        assert_eq!(brad.len(), 1);
        assert_eq!(brad[0].key, "CAR1");

        let toyota = f.contract.query_cars_by_make(&f.ctx("q"), "Toyota").unwrap();
        assert_eq!(toyota.len(), 1);
        assert_eq!(toyota[0].record.as_car().unwrap().model, "Prius");

        assert!(f.contract.query_cars_by_make(&f.ctx("q"), "Lada").unwrap().is_empty());
        assert_eq!(f.store.open_iterators(), 0);
    }

    #[test]
    fn test_history_after_two_mutations() {
        let f = Fixture::new();
        f.contract.create_car(&f.ctx("tx-1"), prius()).unwrap();
        f.contract.change_car_owner(&f.ctx("tx-2"), "CAR10", "Jane").unwrap();

        let history = f.contract.get_car_history(&f.ctx("q"), "CAR10").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].transaction_id, "tx-1");
        assert_eq!(history[1].transaction_id, "tx-2");
        assert!(history.iter().all(|h| !h.is_delete));
        assert_eq!(history[0].value.as_ref().unwrap().as_car().unwrap().owner, "Tomoko");
        assert_eq!(history[1].value.as_ref().unwrap().as_car().unwrap().owner, "Jane");

        assert!(f.contract.get_car_history(&f.ctx("q"), "CAR99").unwrap().is_empty());
    }

    #[test]
    fn test_invoke_dispatch() {
        let f = Fixture::new();
        assert_eq!(f.invoke("initLedger", &[]).unwrap(), "");

        let all: Value = serde_json::from_str(&f.invoke("queryAllCars", &[]).unwrap()).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 5);

        let created: Value = serde_json::from_str(
            &f.invoke("createCar", &["CAR5", "Audi", "A4", "white", "Nina", "2017", "40000", "18000.5"])
                .unwrap(),
        )
        .unwrap();
        assert_eq!(created["year"], 2017);
        assert_eq!(created["mileage"], 40000);
        assert_eq!(created["price"], 18000.5);

        let history: Value = serde_json::from_str(&f.invoke("getCarHistory", &["CAR5"]).unwrap()).unwrap();
        assert_eq!(history[0]["isDelete"], false);
    }

    #[test]
    fn test_invoke_rejects_bad_calls() {
        let f = Fixture::new();
        assert!(matches!(
            f.invoke("deleteCar", &["CAR0"]),
            Err(LedgerError::UnknownFunction { .. })
        ));

        let err = f.invoke("createCar", &["CAR5", "Audi"]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArguments { actual: 2, .. }));
        assert!(err.to_string().contains("5-8"));

        assert!(matches!(
            f.invoke("queryCar", &[]),
            Err(LedgerError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_every_listed_function_dispatches() {
        let f = Fixture::new();
        for function in FUNCTIONS {
            let err = f.invoke(function, &["a", "b", "c", "d", "e", "f", "g", "h", "i"]);
            assert!(
                !matches!(err, Err(LedgerError::UnknownFunction { .. })),
                "{} is not dispatched",
                function
            );
        }
    }
}

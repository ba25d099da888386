//! Structural comparison of table descriptions
//!
//! Two descriptions are equivalent when they agree on everything a `CREATE`
//! statement can express. Timestamps, statistics, serde properties and
//! catalog-managed table properties are not part of that. A table without a
//! provider is a legacy table and compares equal to one marked `hive`.

use chrono::{DateTime, Utc};

use crate::format::{HIVE_PROVIDER, to_triple};
use crate::properties::filter_properties;
use crate::table::TableDescription;

/// Copy of `table` with every non-semantic field reset
pub fn normalize(table: &TableDescription) -> TableDescription {
    let mut normalized = table.clone();
    normalized.create_time = DateTime::<Utc>::UNIX_EPOCH;
    normalized.last_access_time = DateTime::<Utc>::UNIX_EPOCH;
    normalized.stats = None;
    normalized.storage.properties.clear();
    normalized.ignored_properties.clear();
    normalized.tracks_partitions_in_catalog = false;
    normalized.properties = filter_properties(&table.properties);
    if !table.is_view() && table.provider.is_none() {
        normalized.provider = Some(HIVE_PROVIDER.to_string());
    }
    normalized
}

pub fn equivalent(a: &TableDescription, b: &TableDescription) -> bool {
    normalize(a) == normalize(b)
}

/// Compare a legacy table with its natively regenerated counterpart
///
/// The native table only records a provider name, so its storage triple is
/// filled in from the format registry and the provider is ignored on both
/// sides.
pub fn equivalent_after_provider_fill(hive: &TableDescription, native: &TableDescription) -> bool {
    let (hive, native) = provider_filled(hive, native);
    hive == native
}

fn provider_filled(
    hive: &TableDescription,
    native: &TableDescription,
) -> (TableDescription, TableDescription) {
    let mut filled = native.clone();
    if let Some(triple) = native.provider.as_deref().and_then(to_triple) {
        filled.storage.input_format = Some(triple.input_format.to_string());
        filled.storage.output_format = Some(triple.output_format.to_string());
        filled.storage.serde = triple.serde.map(str::to_string);
    }

    let mut hive = normalize(hive);
    let mut native = normalize(&filled);
    hive.provider = None;
    native.provider = None;
    (hive, native)
}

/// Names and values of the fields that differ after normalization
///
/// Empty exactly when [`equivalent`] holds.
pub fn differences(a: &TableDescription, b: &TableDescription) -> Vec<String> {
    diff_normalized(&normalize(a), &normalize(b))
}

/// Like [`differences`], but for a legacy table against its native counterpart
pub fn differences_after_provider_fill(
    hive: &TableDescription,
    native: &TableDescription,
) -> Vec<String> {
    let (hive, native) = provider_filled(hive, native);
    diff_normalized(&hive, &native)
}

fn diff_normalized(a: &TableDescription, b: &TableDescription) -> Vec<String> {
    let mut diffs = Vec::new();

    macro_rules! compare {
        ($($field:ident),+ $(,)?) => {
            $(
                if a.$field != b.$field {
                    diffs.push(format!(
                        "{}: {:?} != {:?}",
                        stringify!($field),
                        a.$field,
                        b.$field
                    ));
                }
            )+
        };
    }

    compare!(
        identifier,
        kind,
        schema,
        partition_column_names,
        bucket_spec,
        storage,
        provider,
        comment,
        properties,
        view,
        unsupported_features,
    );

    diffs
}

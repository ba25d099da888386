//! Format registry
//!
//! Maps the short file format names understood by `USING` / `STORED AS` to the
//! input format, output format and serde classes of the legacy Hive storage
//! convention, and back. Adding a format is one entry in [`FORMATS`].

use serde::Serialize;

/// Provider tag that marks a legacy Hive serde table
pub const HIVE_PROVIDER: &str = "hive";

/// Serde used by text-like Hive formats that do not declare their own
pub const DEFAULT_SERDE: &str = "org.apache.hadoop.hive.serde2.lazy.LazySimpleSerDe";

/// File format assumed for Hive tables created without `STORED AS`
pub const DEFAULT_HIVE_FORMAT: &str = "textfile";

/// Input format, output format and serde class names of one storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatTriple {
    pub input_format: &'static str,
    pub output_format: &'static str,
    /// `None` for formats whose serde is chosen by the table (text, sequence)
    pub serde: Option<&'static str>,
}

struct FormatEntry {
    name: &'static str,
    /// Whether a data source with the same name can read and write the files
    native: bool,
    triple: FormatTriple,
}

static FORMATS: &[FormatEntry] = &[
    FormatEntry {
        name: "parquet",
        native: true,
        triple: FormatTriple {
            input_format: "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat",
            output_format: "org.apache.hadoop.hive.ql.io.parquet.MapredParquetOutputFormat",
            serde: Some("org.apache.hadoop.hive.ql.io.parquet.serde.ParquetHiveSerDe"),
        },
    },
    FormatEntry {
        name: "orc",
        native: true,
        triple: FormatTriple {
            input_format: "org.apache.hadoop.hive.ql.io.orc.OrcInputFormat",
            output_format: "org.apache.hadoop.hive.ql.io.orc.OrcOutputFormat",
            serde: Some("org.apache.hadoop.hive.ql.io.orc.OrcSerde"),
        },
    },
    FormatEntry {
        name: "avro",
        native: true,
        triple: FormatTriple {
            input_format: "org.apache.hadoop.hive.ql.io.avro.AvroContainerInputFormat",
            output_format: "org.apache.hadoop.hive.ql.io.avro.AvroContainerOutputFormat",
            serde: Some("org.apache.hadoop.hive.serde2.avro.AvroSerDe"),
        },
    },
    FormatEntry {
        name: "textfile",
        native: false,
        triple: FormatTriple {
            input_format: "org.apache.hadoop.mapred.TextInputFormat",
            output_format: "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat",
            serde: None,
        },
    },
    FormatEntry {
        name: "sequencefile",
        native: false,
        triple: FormatTriple {
            input_format: "org.apache.hadoop.mapred.SequenceFileInputFormat",
            output_format: "org.apache.hadoop.mapred.SequenceFileOutputFormat",
            serde: None,
        },
    },
    FormatEntry {
        name: "rcfile",
        native: false,
        triple: FormatTriple {
            input_format: "org.apache.hadoop.hive.ql.io.RCFileInputFormat",
            output_format: "org.apache.hadoop.hive.ql.io.RCFileOutputFormat",
            serde: Some("org.apache.hadoop.hive.serde2.columnar.LazyBinaryColumnarSerDe"),
        },
    },
];

/// Look up the storage triple of a format name (case-insensitive)
///
/// # Example
/// ```
/// use catalog_ddl::format::to_triple;
///
/// let triple = to_triple("PARQUET").unwrap();
/// assert_eq!(triple.input_format, "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat");
/// assert!(to_triple("json").is_none());
/// ```
pub fn to_triple(tag: &str) -> Option<FormatTriple> {
    FORMATS
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(tag))
        .map(|entry| entry.triple)
}

/// Find the data source provider that reads the same files as a Hive triple
///
/// Matching is exact on all three class names. Formats without a native
/// data source (text, sequence, rc files) never match.
pub fn to_provider_tag(
    input_format: Option<&str>,
    output_format: Option<&str>,
    serde: Option<&str>,
) -> Option<&'static str> {
    FORMATS
        .iter()
        .filter(|entry| entry.native)
        .find(|entry| {
            Some(entry.triple.input_format) == input_format
                && Some(entry.triple.output_format) == output_format
                && entry.triple.serde == serde
        })
        .map(|entry| entry.name)
}

/// Whether a provider tag names the legacy Hive serde convention
pub fn is_hive_provider(provider: Option<&str>) -> bool {
    provider.is_none_or(|p| p.eq_ignore_ascii_case(HIVE_PROVIDER))
}

/// Names of all registered formats, in registry order
pub fn format_names() -> impl Iterator<Item = &'static str> {
    FORMATS.iter().map(|entry| entry.name)
}

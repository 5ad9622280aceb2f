//! Encodes samples in the OpenMetrics text format with `prometheus-client`.
//!
//! Every scrape gets a fresh [`Registry`], so series of peers or devices that
//! went away are never served again.

use std::fmt;

use prometheus_client::encoding::text;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;

use crate::collector::{MetricDesc, MetricKind, Sample, Value};

/// Content type of the encoded output.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

// Suffix prometheus-client appends to counter names.
const COUNTER_SUFFIX: &str = "_total";

type Labels = Vec<(String, String)>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error collecting metric {metric}: {error}")]
    Invalid { metric: &'static str, error: String },
    #[error("failed to write metrics: {0}")]
    Fmt(#[from] fmt::Error),
}

/// Builds a registry holding `samples`, one family per entry of `descs`.
///
/// Metrics without samples are left out. Fails on the first invalid sample.
pub fn registry(descs: &[&'static MetricDesc], samples: &[Sample]) -> Result<Registry, Error> {
    for sample in samples {
        if let Value::Invalid(error) = &sample.value {
            return Err(Error::Invalid {
                metric: sample.desc.name,
                error: error.clone(),
            });
        }
    }

    let mut registry = Registry::default();
    for desc in descs {
        let group: Vec<_> = samples
            .iter()
            .filter_map(|s| match s.value {
                Value::Number(v) if s.desc == *desc => Some((labels(s), v)),
                _ => None,
            })
            .collect();
        if group.is_empty() {
            continue;
        }

        // prometheus-client adds the trailing period itself
        let help = desc.help.trim_end_matches('.');
        match desc.kind {
            MetricKind::Counter => {
                let family = Family::<Labels, Counter>::default();
                for (labels, v) in &group {
                    family.get_or_create(labels).inc_by(*v);
                }
                let name = desc.name.strip_suffix(COUNTER_SUFFIX).unwrap_or(desc.name);
                registry.register(name, help, family);
            }
            MetricKind::Gauge => {
                let family = Family::<Labels, Gauge>::default();
                for (labels, v) in &group {
                    family
                        .get_or_create(labels)
                        .set(i64::try_from(*v).unwrap_or(i64::MAX));
                }
                registry.register(desc.name, help, family);
            }
        }
    }
    Ok(registry)
}

/// Encodes `samples` into a newly allocated string.
pub fn encode_to_string(
    descs: &[&'static MetricDesc],
    samples: &[Sample],
) -> Result<String, Error> {
    let registry = registry(descs, samples)?;
    let mut s = String::new();
    text::encode(&mut s, &registry)?;
    Ok(s)
}

fn labels(sample: &Sample) -> Labels {
    sample
        .label_pairs()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

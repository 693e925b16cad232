use std::net::IpAddr;

use serde::Serialize;
use warmind_core::config::{AppConfig, LoadOptions};
use warmind_db::repositories::{ManifestRepository, SqlManifestRepository};
use warmind_db::{connect_with_settings, DbPool};

use crate::commands::runtime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn new(name: &'static str, status: CheckStatus, details: impl Into<String>) -> Self {
        Self { name, status, details: details.into() }
    }

    fn skipped(name: &'static str) -> Self {
        Self::new(name, CheckStatus::Skipped, "skipped because configuration did not load")
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::new(
                "config_validation",
                CheckStatus::Pass,
                "configuration loaded and validated",
            ));
            checks.push(check_outbound_addresses(&config));
            checks.extend(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck::new("config_validation", CheckStatus::Fail, error.to_string()));
            checks.push(DoctorCheck::skipped("outbound_addresses"));
            checks.push(DoctorCheck::skipped("database_connectivity"));
            checks.push(DoctorCheck::skipped("item_manifest"));
        }
    }

    // Warnings degrade the service but do not stop it from starting.
    let failed = checks.iter().any(|check| matches!(check.status, CheckStatus::Fail | CheckStatus::Skipped));
    let warned = checks.iter().any(|check| check.status == CheckStatus::Warn);
    let (overall_status, summary) = match (failed, warned) {
        (true, _) => (CheckStatus::Fail, "doctor: one or more readiness checks failed"),
        (false, true) => (CheckStatus::Warn, "doctor: ready with warnings"),
        (false, false) => (CheckStatus::Pass, "doctor: all readiness checks passed"),
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

/// Unparseable lines in the address file are reported; the pool would skip them.
fn check_outbound_addresses(config: &AppConfig) -> DoctorCheck {
    let path = &config.remote.local_addresses_file;
    let mut addresses = config.remote.local_addresses.clone();
    if let Ok(raw) = std::fs::read_to_string(path) {
        addresses.extend(raw.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_string));
    }

    let invalid: Vec<&String> = addresses.iter().filter(|address| address.parse::<IpAddr>().is_err()).collect();
    if !invalid.is_empty() {
        return DoctorCheck::new(
            "outbound_addresses",
            CheckStatus::Warn,
            format!("{} unusable address(es) will be skipped: {}", invalid.len(), join(&invalid)),
        );
    }

    if addresses.is_empty() {
        DoctorCheck::new(
            "outbound_addresses",
            CheckStatus::Pass,
            format!("no local addresses in config or `{}`; one default client will be used", path.display()),
        )
    } else {
        DoctorCheck::new(
            "outbound_addresses",
            CheckStatus::Pass,
            format!("{} outbound client(s) configured", addresses.len()),
        )
    }
}

fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err((_, message, _)) => {
            return vec![
                DoctorCheck::new("database_connectivity", CheckStatus::Fail, message),
                DoctorCheck::new("item_manifest", CheckStatus::Skipped, "skipped because the runtime did not start"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck::new(
                        "database_connectivity",
                        CheckStatus::Fail,
                        format!("failed to connect to database: {error}"),
                    ),
                    DoctorCheck::new(
                        "item_manifest",
                        CheckStatus::Skipped,
                        "skipped because the database is unreachable",
                    ),
                ];
            }
        };

        let connectivity = DoctorCheck::new(
            "database_connectivity",
            CheckStatus::Pass,
            format!("connected using `{}`", config.database.url),
        );
        let manifest = check_manifest(&pool).await;
        pool.close().await;
        vec![connectivity, manifest]
    })
}

async fn check_manifest(pool: &DbPool) -> DoctorCheck {
    match SqlManifestRepository::new(pool.clone()).load_definitions().await {
        Ok(definitions) if definitions.is_empty() => DoctorCheck::new(
            "item_manifest",
            CheckStatus::Warn,
            "no item definitions stored; run `warmind manifest import <file.json>`",
        ),
        Ok(definitions) => DoctorCheck::new(
            "item_manifest",
            CheckStatus::Pass,
            format!("{} item definitions stored", definitions.len()),
        ),
        Err(error) => DoctorCheck::new(
            "item_manifest",
            CheckStatus::Fail,
            format!("{error}; run `warmind migrate` if the schema is missing"),
        ),
    }
}

fn join(values: &[&String]) -> String {
    values.iter().map(|value| value.as_str()).collect::<Vec<_>>().join(", ")
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

use crate::{
    artifacts::{
        collection::{ExtractContext, new_candidate},
        diagnostics::Diagnostics,
        error::ExtractError,
    },
    utils::{
        nom_helper::{Endian, nom_unsigned_four_bytes},
        regex_options::create_regex,
        strings::lossy_text,
        time::{RawTime, normalize},
    },
};
use common::android::{ArtifactKind, TimestampCandidate};
use log::{error, info};
use regex::Regex;

pub(crate) const PACKAGE_RESTRICTIONS_PATH: &str = "data/system/users/0/package-restrictions.xml";

/// `ABX\0` header of Android binary XML
const ABX_MAGIC: u32 = 0x41425800;

/// Setup applications shipped by Google and the larger vendors. Checked in order
pub(crate) const SETUP_PACKAGES: [&str; 5] = [
    "com.google.android.setupwizard",
    "com.sec.android.app.SecSetupWizard",
    "com.android.provision",
    "com.lge.setupwizard",
    "com.huawei.hwstartupguide",
];

const PKG_TAG: &str = r"<pkg\b[^>]*>";
const PKG_NAME: &str = r#"\bname="([^"]+)""#;
const INSTALL_TIME: &str = r#"\b(?:first-install-time|firstInstallTime)="(\d{10,13})""#;

struct InstallTime {
    package: String,
    value: i64,
    original: String,
}

/// First install time of the setup wizard package. The file is usually ABX and needs the external decoder
pub(crate) fn package_restrictions(
    context: &ExtractContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<TimestampCandidate> {
    let kind = ArtifactKind::PackageRestrictions;
    let path = PACKAGE_RESTRICTIONS_PATH;
    let data = match context.read(kind, path, diagnostics) {
        Some(result) => result,
        None => return Vec::new(),
    };

    let xml = match restrictions_xml(context, &data) {
        Ok(result) => result,
        Err(err) => {
            diagnostics.decode_failure(kind, path, &err.to_string());
            return Vec::new();
        }
    };

    let times = install_times(&xml);
    let (entry, label) = match select_install_time(&times) {
        Some(result) => result,
        None => {
            diagnostics.no_time(kind, path, xml.as_bytes());
            return Vec::new();
        }
    };

    match normalize(&RawTime::Integer(entry.value), context.convention(kind)) {
        Ok(time) => vec![new_candidate(kind, path, &label, &time, &entry.original)],
        Err(err) => {
            diagnostics.parse_failure(kind, path, &err.to_string(), entry.original.as_bytes());
            Vec::new()
        }
    }
}

pub(crate) fn is_abx(data: &[u8]) -> bool {
    match nom_unsigned_four_bytes(data, Endian::Be) {
        Ok((_, magic)) => magic == ABX_MAGIC,
        Err(_err) => false,
    }
}

fn restrictions_xml(context: &ExtractContext<'_>, data: &[u8]) -> Result<String, ExtractError> {
    if !is_abx(data) {
        return Ok(lossy_text(data));
    }
    match context.decoder.decode(data) {
        Ok(result) => Ok(result),
        Err(err) => {
            info!("[packages] Binary XML could not be decoded: {err:?}");
            Err(ExtractError::DecodeFailure)
        }
    }
}

fn install_times(xml: &str) -> Vec<InstallTime> {
    let (tag_regex, name_regex, time_regex) = match compile() {
        Some(result) => result,
        None => return Vec::new(),
    };

    let mut times = Vec::new();
    for tag in tag_regex.find_iter(xml) {
        let tag = tag.as_str();
        let value = match time_regex
            .captures(tag)
            .and_then(|captures| captures.get(1))
            .and_then(|value| value.as_str().parse::<i64>().ok())
        {
            Some(result) => result,
            None => continue,
        };
        let package = name_regex
            .captures(tag)
            .and_then(|captures| captures.get(1))
            .map(|name| name.as_str().to_string())
            .unwrap_or_default();

        times.push(InstallTime {
            package,
            value,
            original: tag.to_string(),
        });
    }
    times
}

fn compile() -> Option<(Regex, Regex, Regex)> {
    let compiled = (
        create_regex(PKG_TAG),
        create_regex(PKG_NAME),
        create_regex(INSTALL_TIME),
    );
    match compiled {
        (Ok(tag), Ok(name), Ok(time)) => Some((tag, name, time)),
        _ => {
            error!("[packages] Could not compile package regexes");
            None
        }
    }
}

/// Prefer a known setup package. Otherwise use the earliest install time in the file
fn select_install_time(times: &[InstallTime]) -> Option<(&InstallTime, String)> {
    for package in SETUP_PACKAGES {
        if let Some(entry) = times.iter().find(|entry| entry.package == package) {
            return Some((entry, format!("setup package first install ({package})")));
        }
    }

    let earliest = times.iter().min_by_key(|entry| entry.value)?;
    Some((
        earliest,
        format!("earliest package first install ({})", earliest.package),
    ))
}

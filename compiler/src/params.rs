use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::error::BeanError;

lazy_static! {
    static ref JAVA_PACKAGE: Regex = Regex::new(r"^[a-z_][a-z0-9_]*(\.[a-z_][a-z0-9_]*)*$").unwrap();
}

/// How value objects are split into source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One artifact per top-level message or enum.
    #[default]
    Type,
    /// One artifact per proto file, holding every type in a wrapper class.
    File,
}

/// Plugin options from the `--bean_out=key=value,...:dir` parameter string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub vo_package:        String,
    pub converter_package: String,
    pub layout:            Layout,
    pub annotate_code:     bool,
}

/// Lower-cases a package option and strips leading and trailing dots.
fn to_java_package(param: &str) -> String {
    param.to_lowercase().trim_matches('.').to_string()
}

fn check_package(key: &str, package: &str) -> Result<(), BeanError> {
    if JAVA_PACKAGE.is_match(package) {
        Ok(())
    } else {
        Err(BeanError::Config(format!("invalid {} {:?}: not a Java package name", key, package)))
    }
}

impl Params {
    pub fn parse(parameter: &str) -> Result<Params, BeanError> {
        let mut raw = BTreeMap::new();
        for item in parameter.split(',').filter(|p| !p.is_empty()) {
            match item.split_once('=') {
                Some((k, v)) => raw.insert(k.trim(), v.trim()),
                None => raw.insert(item.trim(), ""),
            };
        }

        let vo_package = to_java_package(raw.get("vopkg").copied().unwrap_or_default());
        if vo_package.is_empty() {
            return Err(BeanError::Config(
                "invalid vo package, use --bean_out=vopkg=[package.of.vo] to set".to_string(),
            ));
        }
        check_package("vopkg", &vo_package)?;

        let converter_package = match raw.get("cvtpkg").map(|v| to_java_package(v)) {
            Some(pkg) if !pkg.is_empty() => pkg,
            _ => format!("{}.converter", vo_package),
        };
        check_package("cvtpkg", &converter_package)?;

        let layout = match raw.get("layout").copied() {
            None | Some("type") => Layout::Type,
            Some("file") => Layout::File,
            Some(other) => {
                return Err(BeanError::Config(format!(
                    "unknown layout {:?}: want \"type\" or \"file\"",
                    other
                )))
            }
        };

        let annotate_code = matches!(raw.get("annotate_code").copied(), Some("") | Some("true"));

        for key in raw.keys().filter(|k| !["vopkg", "cvtpkg", "layout", "annotate_code"].contains(*k)) {
            warn!(parameter = %key, "ignoring unknown parameter");
        }

        Ok(Params { vo_package, converter_package, layout, annotate_code })
    }
}

#[test]
fn parse_defaults() {
    let params = Params::parse("vopkg=.Com.Acme.VO.").unwrap();
    assert_eq!(params.vo_package, "com.acme.vo");
    assert_eq!(params.converter_package, "com.acme.vo.converter");
    assert_eq!(params.layout, Layout::Type);
    assert!(!params.annotate_code);
}

#[test]
fn parse_all_options() {
    let params = Params::parse("vopkg=com.acme.vo,cvtpkg=com.acme.cvt,layout=file,annotate_code,extra=1").unwrap();
    assert_eq!(params.converter_package, "com.acme.cvt");
    assert_eq!(params.layout, Layout::File);
    assert!(params.annotate_code);
}

#[test]
fn missing_vopkg_is_fatal() {
    assert!(matches!(Params::parse(""), Err(BeanError::Config(_))));
    assert!(matches!(Params::parse("cvtpkg=a.b"), Err(BeanError::Config(_))));
    assert!(matches!(Params::parse("vopkg=..."), Err(BeanError::Config(_))));
}

#[test]
fn rejects_bad_packages_and_layouts() {
    assert!(Params::parse("vopkg=com.1acme").is_err());
    assert!(Params::parse("vopkg=com..acme").is_err());
    assert!(Params::parse("vopkg=com.acme,layout=tree").is_err());
}

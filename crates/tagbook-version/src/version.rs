use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("malformed tag '{0}': does not match the version grammar")]
    MalformedTag(String),
    #[error("numeric component out of range in tag '{0}'")]
    Overflow(String),
}

/// Pre-release qualifier kind. Variant order is the ordering: alpha < beta < rc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreKind {
    Alpha,
    Beta,
    Rc,
}

impl fmt::Display for PreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PreKind::Alpha => "alpha",
            PreKind::Beta => "beta",
            PreKind::Rc => "rc",
        })
    }
}

/// A pre-release qualifier: kind plus its numeric suffix (`beta1`, `rc2`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub kind: PreKind,
    pub number: u32,
}

/// What follows the major component: exactly one of a numeric minor (a final
/// release) or a pre-release qualifier. Variant order makes every pre-release
/// sort before every final release of the same major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReleaseSegment {
    Pre(PreRelease),
    Final { minor: u32 },
}

/// A tag normalized into a totally ordered value.
///
/// The derived `Ord` is the authoritative comparison: major first, then the
/// release segment (pre-releases before finals, alpha < beta < rc, numeric
/// suffixes numeric), then the auxiliary components in declaration order —
/// extension version before build timestamp, with `None < Some` giving the
/// absence-orders-before-presence rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParsedVersion {
    major: u32,
    segment: ReleaseSegment,
    extension: Option<Vec<u64>>,
    timestamp: Option<u64>,
}

/// The tag grammar. Both `-` and `.` are accepted as separators before the
/// auxiliary components; a trailing 12-digit component is always the build
/// timestamp, never part of the extension version (the extension repetition
/// is lazy, so the timestamp alternative is preferred for the last component).
const GRAMMAR: &str = r"^(?P<major>\d+)(?:\.(?P<minor>\d+)|(?P<prekind>alpha|beta|rc)(?P<prenum>\d+))(?:[-.](?P<ext>\d+(?:\.\d+)+?))?(?:[-.](?P<ts>\d{12}))?$";

fn grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(GRAMMAR).expect("version grammar is a valid regex"))
}

impl ParsedVersion {
    /// Parse a tag with its type/distribution suffix already stripped.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let caps = grammar()
            .captures(text)
            .ok_or_else(|| VersionError::MalformedTag(text.to_owned()))?;

        let overflow = || VersionError::Overflow(text.to_owned());

        let major: u32 = caps["major"].parse().map_err(|_| overflow())?;

        let segment = if let Some(minor) = caps.name("minor") {
            ReleaseSegment::Final {
                minor: minor.as_str().parse().map_err(|_| overflow())?,
            }
        } else {
            let kind = match &caps["prekind"] {
                "alpha" => PreKind::Alpha,
                "beta" => PreKind::Beta,
                _ => PreKind::Rc,
            };
            ReleaseSegment::Pre(PreRelease {
                kind,
                number: caps["prenum"].parse().map_err(|_| overflow())?,
            })
        };

        let extension = caps
            .name("ext")
            .map(|m| {
                m.as_str()
                    .split('.')
                    .map(str::parse)
                    .collect::<Result<Vec<u64>, _>>()
            })
            .transpose()
            .map_err(|_| overflow())?;

        let timestamp = caps
            .name("ts")
            .map(|m| m.as_str().parse())
            .transpose()
            .map_err(|_| overflow())?;

        Ok(Self {
            major,
            segment,
            extension,
            timestamp,
        })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn segment(&self) -> ReleaseSegment {
        self.segment
    }

    pub fn is_pre_release(&self) -> bool {
        matches!(self.segment, ReleaseSegment::Pre(_))
    }
}

impl FromStr for ParsedVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParsedVersion {
    /// Canonical textual form: `-` separators throughout, timestamp padded to
    /// 12 digits. Re-parsing the output yields an equal value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        match self.segment {
            ReleaseSegment::Final { minor } => write!(f, ".{minor}")?,
            ReleaseSegment::Pre(pre) => write!(f, "{}{}", pre.kind, pre.number)?,
        }
        if let Some(ext) = &self.extension {
            let joined: Vec<String> = ext.iter().map(u64::to_string).collect();
            write!(f, "-{}", joined.join("."))?;
        }
        if let Some(ts) = self.timestamp {
            write!(f, "-{ts:012}")?;
        }
        Ok(())
    }
}

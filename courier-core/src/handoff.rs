//! Turn-by-turn navigation handoff to an external app.
//!
//! Handoff is modelled as a pure function from a destination to an ordered
//! list of candidate URLs plus a single combinator that opens them in order
//! until one succeeds. Nothing here touches the operating system; callers
//! supply a [`UrlLauncher`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::Stop;

/// Android package identifier of the navigation app.
pub const TMAP_ANDROID_PACKAGE: &str = "com.skt.tmap.ku";
/// App store listing used when the app is not installed on iOS.
pub const TMAP_IOS_STORE_URL: &str = "https://apps.apple.com/kr/app/id431589174";

/// Mobile platform deciding which store fallback is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Android,
    Ios,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Android => f.write_str("android"),
            Self::Ios => f.write_str("ios"),
        }
    }
}

/// Error returned when parsing an unknown platform name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform {0:?}; expected \"android\" or \"ios\"")]
pub struct ParsePlatformError(pub String);

impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            other => Err(ParsePlatformError(other.to_owned())),
        }
    }
}

/// Failure to open a single URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not open {url}: {reason}")]
pub struct LaunchError {
    pub url: String,
    pub reason: String,
}

/// Opens URLs on behalf of the handoff chain.
pub trait UrlLauncher {
    /// Attempt to open `url`.
    fn open(&self, url: &str) -> Result<(), LaunchError>;
}

/// Ordered navigation URLs for `stop` on `platform`.
///
/// Deep links come first (route scheme, then the bare scheme), followed by
/// store listings so the courier can install the app.
///
/// # Examples
/// ```
/// use courier_core::{Coordinate, Platform, Stop, StopId, navigation_candidates};
///
/// # fn main() -> Result<(), courier_core::CoordinateError> {
/// let stop = Stop::new(StopId(1), "City Hall", Coordinate::new(37.5665, 126.978)?);
/// let urls = navigation_candidates(&stop, Platform::Ios);
/// assert_eq!(
///     urls[0],
///     "tmap://route?rGoName=City%20Hall&rGoX=126.978&rGoY=37.5665"
/// );
/// assert_eq!(urls.len(), 3);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn navigation_candidates(stop: &Stop, platform: Platform) -> Vec<String> {
    let name = urlencoding::encode(&stop.address);
    let x = stop.location.lng();
    let y = stop.location.lat();
    let mut candidates = vec![
        format!("tmap://route?rGoName={name}&rGoX={x}&rGoY={y}"),
        format!("tmap://?rGoName={name}&rGoX={x}&rGoY={y}"),
    ];
    match platform {
        Platform::Android => {
            candidates.push(format!("market://details?id={TMAP_ANDROID_PACKAGE}"));
            candidates.push(format!(
                "https://play.google.com/store/apps/details?id={TMAP_ANDROID_PACKAGE}"
            ));
        }
        Platform::Ios => candidates.push(TMAP_IOS_STORE_URL.to_owned()),
    }
    candidates
}

/// Open `candidates` in order and stop at the first success.
///
/// Returns the URL that opened, or `None` when every attempt failed.
pub fn launch_first<'a, L>(launcher: &L, candidates: &'a [String]) -> Option<&'a str>
where
    L: UrlLauncher + ?Sized,
{
    candidates.iter().map(String::as_str).find(|url| {
        launcher
            .open(url)
            .inspect_err(|err| log::debug!("navigation handoff attempt failed: {err}"))
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinate;
    use crate::StopId;
    use crate::test_support::RecordingLauncher;
    use rstest::{fixture, rstest};

    #[fixture]
    fn stop() -> Stop {
        Stop::new(
            StopId(9),
            "Seoul Station",
            Coordinate::new(37.5547, 126.9707).expect("valid coordinate"),
        )
    }

    #[rstest]
    fn android_falls_back_to_market_then_web_store(stop: Stop) {
        let urls = navigation_candidates(&stop, Platform::Android);
        assert_eq!(urls.len(), 4);
        assert!(urls[0].starts_with("tmap://route?rGoName=Seoul%20Station"));
        assert!(urls[1].starts_with("tmap://?rGoName="));
        assert_eq!(urls[2], "market://details?id=com.skt.tmap.ku");
        assert_eq!(
            urls[3],
            "https://play.google.com/store/apps/details?id=com.skt.tmap.ku"
        );
    }

    #[rstest]
    fn ios_falls_back_to_app_store(stop: Stop) {
        let urls = navigation_candidates(&stop, Platform::Ios);
        assert_eq!(urls.last().map(String::as_str), Some(TMAP_IOS_STORE_URL));
    }

    #[rstest]
    fn stops_at_first_success(stop: Stop) {
        let urls = navigation_candidates(&stop, Platform::Android);
        let launcher = RecordingLauncher::accepting_prefix("tmap://?");
        let opened = launch_first(&launcher, &urls);
        assert_eq!(opened, urls.get(1).map(String::as_str));
        assert_eq!(launcher.attempts().len(), 2);
    }

    #[rstest]
    fn returns_none_when_everything_fails(stop: Stop) {
        let urls = navigation_candidates(&stop, Platform::Ios);
        let launcher = RecordingLauncher::rejecting_all();
        assert_eq!(launch_first(&launcher, &urls), None);
        assert_eq!(launcher.attempts(), urls);
    }

    #[rstest]
    #[case("android", Platform::Android)]
    #[case(" iOS ", Platform::Ios)]
    fn parses_platform_names(#[case] raw: &str, #[case] expected: Platform) {
        assert_eq!(raw.parse::<Platform>(), Ok(expected));
    }
}

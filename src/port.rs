use serde::Deserialize;
use serde_with::serde_as;
use serde_with::DisplayFromStr;
use std::time::Duration;

use crate::Args;
use crate::Error;

/// Device port settings handed to a backend when the session opens.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortSettings {
    #[serde(default)]
    pub rig_pathname: String,
    /// Delay between bytes, in ms.
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub write_delay: u64,
    /// Delay between commands, in ms.
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub post_write_delay: u64,
    /// Reply timeout of one attempt, in ms.
    #[serde_as(as = "DisplayFromStr")]
    pub timeout: u64,
    /// Attempts after the first one.
    #[serde_as(as = "DisplayFromStr")]
    pub retry: u32,
}

impl PortSettings {
    pub fn from_args(args: &Args) -> Result<Self, Error> {
        args.deserialize().ok_or(Error::InvalidParameter)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Run one device transaction, repeating it on [`Error::Timeout`] and [`Error::Io`] up to
    /// `retry` more times.
    ///
    /// Any other error ends the transaction immediately.
    pub fn transact<T>(&self, mut f: impl FnMut(u32) -> Result<T, Error>) -> Result<T, Error> {
        let mut attempt = 0;
        loop {
            match f(attempt) {
                Err(e @ (Error::Timeout | Error::Io)) if attempt < self.retry => {
                    log::debug!("{}: {e}, retry {}/{}", self.rig_pathname, attempt + 1, self.retry);
                    attempt += 1;
                }
                Err(e @ (Error::Timeout | Error::Io)) => {
                    log::warn!("{}: {e} after {} attempts", self.rig_pathname, attempt + 1);
                    return Err(e);
                }
                r => return r,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(retry: u32) -> PortSettings {
        PortSettings {
            rig_pathname: "/dev/rig".to_string(),
            write_delay: 0,
            post_write_delay: 0,
            timeout: 200,
            retry,
        }
    }

    #[test]
    fn from_args() {
        let a: Args = "rig_pathname=/dev/Rig, retry=5, timeout=100, write_delay=2, itu_region=1"
            .parse()
            .unwrap();
        let p = PortSettings::from_args(&a).unwrap();
        assert_eq!(p.rig_pathname, "/dev/Rig");
        assert_eq!(p.retry, 5);
        assert_eq!(p.timeout(), Duration::from_millis(100));
        assert_eq!(p.write_delay, 2);
        assert_eq!(p.post_write_delay, 0);
    }

    #[test]
    fn from_args_rejects_garbage() {
        let a: Args = "retry=five, timeout=100".parse().unwrap();
        assert_eq!(PortSettings::from_args(&a), Err(Error::InvalidParameter));
    }

    #[test]
    fn retries_until_success() {
        let mut calls = 0;
        let r = settings(3).transact(|attempt| {
            calls += 1;
            if attempt < 2 {
                Err(Error::Timeout)
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(r, Ok(2));
        assert_eq!(calls, 3);
    }

    #[test]
    fn gives_up_after_retry_count() {
        let mut calls = 0;
        let r: Result<(), Error> = settings(2).transact(|_| {
            calls += 1;
            Err(Error::Io)
        });
        assert_eq!(r, Err(Error::Io));
        assert_eq!(calls, 3);
    }

    #[test]
    fn other_errors_are_not_retried() {
        let mut calls = 0;
        let r: Result<(), Error> = settings(5).transact(|_| {
            calls += 1;
            Err(Error::OutOfRange)
        });
        assert_eq!(r, Err(Error::OutOfRange));
        assert_eq!(calls, 1);
    }
}

use chrono::{DateTime, Local, Timelike, Utc};

/// Source of the current time.
///
/// Priority scoring depends on the local hour of day, so it is injected rather
/// than read from the system inside the analyzer.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Hour of day (0-23) in the service's local timezone
    fn local_hour(&self) -> u32;
}

/// Wall clock of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// Clock pinned to a given local hour, for tests
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub hour: u32,
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_hour(&self) -> u32 {
        self.hour
    }
}

// Account-level endpoints: registration, sleepers, sleep history

use tracing::debug;

use crate::client::SleepIqClient;
use crate::error::Error;
use crate::models::{Registration, Sleeper, SleeperList};

impl SleepIqClient {
    /// `GET /registration`
    pub async fn registration(&self) -> Result<Registration, Error> {
        debug!("fetching registration");
        self.get("registration", &[]).await
    }

    /// `GET /sleeper`
    pub async fn sleepers(&self) -> Result<Vec<Sleeper>, Error> {
        debug!("listing sleepers");
        let list: SleeperList = self.get("sleeper", &[]).await?;
        Ok(list.sleepers)
    }

    /// Aggregated sleep sessions. The payload shape varies by interval
    /// and is returned untyped.
    ///
    /// `GET /sleepData?date=..&interval=..&sleeper=..`
    pub async fn sleep_data(
        &self,
        date: &str,
        interval: &str,
        sleeper_id: &str,
    ) -> Result<serde_json::Value, Error> {
        debug!(date, interval, sleeper_id, "fetching sleep data");
        self.get(
            "sleepData",
            &[("date", date), ("interval", interval), ("sleeper", sleeper_id)],
        )
        .await
    }

    /// Per-slice sleep data for one night.
    ///
    /// `GET /sleepSliceData?date=..&sleeper=..[&format=..]`
    pub async fn sleep_slice_data(
        &self,
        date: &str,
        sleeper_id: &str,
        format: Option<&str>,
    ) -> Result<serde_json::Value, Error> {
        debug!(date, sleeper_id, "fetching sleep slice data");
        let mut query = vec![("date", date), ("sleeper", sleeper_id)];
        if let Some(format) = format {
            query.push(("format", format));
        }
        self.get("sleepSliceData", &query).await
    }
}

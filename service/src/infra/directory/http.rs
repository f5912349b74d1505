//! HTTP [`Directory`] implementation.

use std::time::Duration;

use common::{
    operations::{By, Select},
    Money, Percent,
};
use derive_more::{Display, Error as StdError, From};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracerr::Traced;
use tracing as log;
use uuid::Uuid;

use crate::{
    domain::{
        room_type::{self, MealPrices, RoomNumber},
        RoomType,
    },
    infra::{directory, Directory},
};

/// [`Http`] [`Directory`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the room service, e.g. `http://rooms:8080`.
    pub base_url: String,

    /// Timeout of a single request.
    pub timeout: Duration,

    /// Maximum number of attempts to perform a request, including the first
    /// one.
    pub max_attempts: u32,

    /// Delay before the first retry, doubled for every next one.
    pub initial_backoff: Duration,

    /// Maximum delay between two attempts.
    pub max_backoff: Duration,
}

/// [`Directory`] fetching [`RoomType`]s from the room service over HTTP.
///
/// Never fails once created: a [`RoomType`] which cannot be fetched is
/// reported as [`RoomType::unavailable()`], so any booking upon it is
/// refused instead of erroring.
#[derive(Clone, Debug)]
pub struct Http {
    /// Underlying HTTP client.
    client: reqwest::Client,

    /// [`Config`] of this [`Http`] [`Directory`].
    config: Config,
}

impl Http {
    /// Creates a new [`Http`] [`Directory`] with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to initialize the underlying HTTP client.
    pub fn new(config: Config) -> Result<Self, Traced<directory::Error>> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self { client, config })
    }

    /// Fetches the [`RoomType`] with the provided ID once.
    async fn fetch(
        &self,
        id: room_type::Id,
    ) -> Result<Option<RoomType>, Error> {
        let url = format!(
            "{}/api/rooms/{id}",
            self.config.base_url.trim_end_matches('/'),
        );
        let resp = self.client.get(url).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                RoomType::try_from(resp.json::<RoomDto>().await?).map(Some)
            }
            s => Err(Error::Status(s)),
        }
    }

    /// Fetches the [`RoomType`] with the provided ID, retrying transient
    /// failures with an exponential backoff.
    async fn fetch_with_retries(
        &self,
        id: room_type::Id,
    ) -> Result<Option<RoomType>, Error> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut delay = self.config.initial_backoff;

        let mut attempt = 1;
        loop {
            match self.fetch(id).await {
                Ok(found) => return Ok(found),
                Err(e) if attempt < max_attempts && e.is_transient() => {
                    log::warn!(
                        attempt,
                        max_attempts,
                        retry_in_ms = delay.as_millis(),
                        "failed to fetch `RoomType({id})`, retrying: {e}",
                    );
                    tokio::time::sleep(delay).await;
                    delay =
                        delay.saturating_mul(2).min(self.config.max_backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Directory<Select<By<Option<RoomType>, room_type::Id>>> for Http {
    type Ok = Option<RoomType>;
    type Err = Traced<directory::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RoomType>, room_type::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.fetch_with_retries(id).await.unwrap_or_else(|e| {
            log::warn!("`RoomType({id})` is considered unavailable: {e}");
            Some(RoomType::unavailable(id))
        }))
    }
}

/// [`Http`] [`Directory`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Request to the room service failed.
    #[display("Request failed: {_0}")]
    Request(reqwest::Error),

    /// Room service responded with an unexpected status.
    #[display("Unexpected response status: {_0}")]
    #[from(ignore)]
    Status(#[error(not(source))] StatusCode),

    /// Room service responded with a malformed room.
    #[display("Malformed room: {_0}")]
    #[from(ignore)]
    Malformed(#[error(not(source))] &'static str),
}

impl Error {
    /// Indicates whether the request may succeed if retried.
    fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => !e.is_decode() && !e.is_builder(),
            Self::Status(s) => s.is_server_error(),
            Self::Malformed(_) => false,
        }
    }
}

/// Room as represented by the room service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomDto {
    id: Uuid,
    name: String,
    total_rooms: i32,
    #[serde(default)]
    room_numbers: Vec<String>,
    price: Decimal,
    #[serde(default)]
    discount: Decimal,
    #[serde(default)]
    breakfast_price: Decimal,
    #[serde(default)]
    lunch_price: Decimal,
    #[serde(default)]
    dinner_price: Decimal,
}

impl TryFrom<RoomDto> for RoomType {
    type Error = Error;

    fn try_from(dto: RoomDto) -> Result<Self, Self::Error> {
        let money = |amount: Decimal, what: &'static str| {
            Money::new(amount).ok_or(Error::Malformed(what))
        };

        Ok(Self {
            id: dto.id.into(),
            name: room_type::Name::new(dto.name)
                .ok_or(Error::Malformed("invalid `name`"))?,
            // Negative capacity means no rooms at all.
            total_rooms: u16::try_from(dto.total_rooms.max(0))
                .map_err(|_| Error::Malformed("too big `totalRooms`"))?,
            room_numbers: dto
                .room_numbers
                .into_iter()
                .map(RoomNumber::new)
                .collect::<Option<_>>()
                .ok_or(Error::Malformed("invalid `roomNumbers`"))?,
            price: money(dto.price, "negative `price`")?,
            discount: Percent::new(dto.discount)
                .ok_or(Error::Malformed("invalid `discount`"))?,
            meals: MealPrices {
                breakfast: money(dto.breakfast_price, "negative breakfast")?,
                lunch: money(dto.lunch_price, "negative lunch")?,
                dinner: money(dto.dinner_price, "negative dinner")?,
            },
        })
    }
}

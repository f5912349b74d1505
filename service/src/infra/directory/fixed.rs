//! [`Fixed`] [`Directory`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{room_type, RoomType},
    infra::{directory, Directory},
};

/// [`Directory`] of a fixed set of [`RoomType`]s known in advance.
#[derive(Clone, Debug, Default)]
pub struct Fixed(Arc<HashMap<room_type::Id, RoomType>>);

impl Fixed {
    /// Creates a new [`Fixed`] [`Directory`] of the provided [`RoomType`]s.
    #[must_use]
    pub fn new(room_types: impl IntoIterator<Item = RoomType>) -> Self {
        Self(Arc::new(
            room_types.into_iter().map(|rt| (rt.id, rt)).collect(),
        ))
    }
}

impl Directory<Select<By<Option<RoomType>, room_type::Id>>> for Fixed {
    type Ok = Option<RoomType>;
    type Err = Traced<directory::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RoomType>, room_type::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.get(&by.into_inner()).cloned())
    }
}

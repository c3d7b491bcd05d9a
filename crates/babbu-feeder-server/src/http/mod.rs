// SPDX-License-Identifier: Apache-2.0

pub(crate) mod handlers;
pub(crate) mod notify;
pub(crate) mod profile;
pub(crate) mod records;

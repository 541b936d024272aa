//! Server-side rendering coordination
//!
//! On the server, [`Registry::get_ssr_variants`] picks (or re-reads from
//! cookies) a variant for every registered experiment and reports new picks
//! through a `set_cookie` callback. The resulting [`SsrData`] is serialized into
//! the response and handed to the client's
//! [`ExperimentSession`](crate::session::ExperimentSession), which uses it
//! without calling the backend again.
//!
//! ```text
//! request cookies ──> get_ssr_variants ──> SsrData ──> response body ──> client session
//!                           │
//!                           └──> set_cookie(_trueno_ab_<name>, variant)
//! ```

use std::collections::btree_map;
use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cookie::{cookie_name, CookieSource};
use crate::query::to_variant_index;
use crate::registry::Registry;
use crate::{Error, Result};

/// Variant chosen per experiment name for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SsrData {
    variants: BTreeMap<String, usize>,
}

impl SsrData {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Variant for an experiment name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.variants.get(name).copied()
    }

    /// Set the variant for an experiment name.
    pub fn insert(&mut self, name: impl Into<String>, variant: usize) {
        self.variants.insert(name.into(), variant);
    }

    /// Number of experiments in the mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// True if the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Iterate over `(name, variant)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.variants.iter().map(|(name, variant)| (name.as_str(), *variant))
    }

    /// Serialize for embedding in a response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a mapping embedded by the server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the payload is not a name-to-index object
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<(String, usize)> for SsrData {
    fn from_iter<T: IntoIterator<Item = (String, usize)>>(iter: T) -> Self {
        Self {
            variants: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SsrData {
    type Item = (String, usize);
    type IntoIter = btree_map::IntoIter<String, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.into_iter()
    }
}

impl Registry {
    /// Seed cached variants from the registry's cookie source.
    ///
    /// Runs only in a server context with a cookie source configured; does
    /// nothing otherwise. Called by `register_experiments` when SSR is enabled.
    pub fn hydrate(&self) {
        if !self.context().is_server() {
            return;
        }
        let Some(cookies) = self.cookies.as_ref() else {
            return;
        };

        let logging = self.logging_enabled();
        // No map lock is held while the cookie source runs.
        for name in self.names() {
            let Some(raw) = cookies.cookie(&cookie_name(&name)) else {
                continue;
            };
            let variant = to_variant_index(&raw);
            if self.set_selected_index(&name, variant).is_ok() && logging {
                tracing::debug!(experiment = %name, variant, "(SSR) hydrated variant from cookie");
            }
        }
    }

    /// Assign a variant to every registered experiment for the current request.
    ///
    /// Existing cookies are reused as-is and never re-emitted; new picks are
    /// uniform in `[0, variant_count)` and reported through `set_cookie`. When
    /// the registry is disabled every experiment gets `0` and no cookie is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotServer`] outside a server context, and
    /// [`Error::SsrDisabled`] if no registration enabled SSR
    pub fn get_ssr_variants<C, F>(&self, cookies: &C, set_cookie: F) -> Result<SsrData>
    where
        C: CookieSource + ?Sized,
        F: FnMut(&str, usize),
    {
        self.get_ssr_variants_with_rng(cookies, set_cookie, &mut rand::thread_rng())
    }

    /// [`get_ssr_variants`](Self::get_ssr_variants) with an explicit random source.
    ///
    /// # Errors
    ///
    /// Same as [`get_ssr_variants`](Self::get_ssr_variants)
    pub fn get_ssr_variants_with_rng<C, F, R>(&self, cookies: &C, mut set_cookie: F, rng: &mut R) -> Result<SsrData>
    where
        C: CookieSource + ?Sized,
        F: FnMut(&str, usize),
        R: Rng,
    {
        if !self.context().is_server() {
            return Err(Error::NotServer("get_ssr_variants"));
        }
        if !self.is_ssr_enabled() {
            return Err(Error::SsrDisabled);
        }

        let disabled = self.is_disabled();
        let logging = self.logging_enabled();
        let mut data = SsrData::new();

        for name in self.names() {
            // Removed concurrently by clean_state.
            let Ok(experiment) = self.get_experiment(&name) else {
                continue;
            };

            if disabled {
                data.insert(name, 0);
                continue;
            }

            let cookie = cookie_name(&name);
            let variant = match cookies.cookie(&cookie) {
                Some(raw) => to_variant_index(&raw),
                None => {
                    let picked = rng.gen_range(0..experiment.variant_count().max(1));
                    set_cookie(&cookie, picked);
                    picked
                }
            };

            if logging {
                tracing::debug!(experiment = %name, id = experiment.id(), variant, "(SSR) assigned variant");
            }
            data.insert(name, variant);
        }

        Ok(data)
    }
}

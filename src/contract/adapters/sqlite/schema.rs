//! Diesel table definitions for the board's three durable tables.
//!
//! Timestamps are unix milliseconds; identities are hyphenated UUID
//! text; money is integer minor units.

diesel::table! {
    /// One row per contract, retained after terminal transitions.
    contracts (id) {
        /// Store-assigned identifier.
        id -> BigInt,
        /// Canonical kind string.
        kind -> Text,
        /// Canonical status string; the permanent historical marker.
        status -> Text,
        /// Contractor identity.
        contractor_id -> Text,
        /// Contractor display name at creation.
        contractor_name -> Text,
        /// Worker identity, set on acceptance.
        worker_id -> Nullable<Text>,
        /// Worker display name at acceptance.
        worker_name -> Nullable<Text>,
        /// Net reward in minor units.
        reward -> BigInt,
        /// Tax consumed at creation, in minor units.
        tax_paid -> BigInt,
        /// Creation timestamp, unix millis.
        created_at -> BigInt,
        /// Expiration timestamp, unix millis.
        expires_at -> BigInt,
        /// Kind-specific payload as tagged JSON.
        metadata -> Text,
    }
}

diesel::table! {
    /// One row per pending refund, deleted on collection.
    refund_mail (id) {
        /// Store-assigned identifier.
        id -> BigInt,
        /// Recipient identity.
        recipient_id -> Text,
        /// Amount owed in minor units.
        amount -> BigInt,
        /// Free-text reason.
        reason -> Text,
        /// Creation timestamp, unix millis.
        created_at -> BigInt,
    }
}

diesel::table! {
    /// One row per participant aggregate.
    participant_stats (participant_id) {
        /// Participant identity.
        participant_id -> Text,
        /// Most recently seen display name.
        display_name -> Text,
        /// Lifetime spend in minor units.
        total_spent -> BigInt,
        /// Lifetime earnings in minor units.
        total_earned -> BigInt,
        /// Number of contracts posted.
        contracts_posted -> BigInt,
        /// Number of contracts completed.
        contracts_completed -> BigInt,
    }
}

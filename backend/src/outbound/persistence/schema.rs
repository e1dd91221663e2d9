//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the migrations exactly; `diesel print-schema` can
//! regenerate them from a live database.

diesel::table! {
    /// Application users.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Login email, unique.
        email -> Varchar,
        /// Role string: superadmin, admin, user, or audit.
        role -> Varchar,
        /// Hex-encoded SHA-256 digest of the password.
        password_digest -> Varchar,
        /// Optional downstream bearer token stored on the user record.
        token -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Provider account tokens linked to users.
    account_tokens (user_id) {
        /// Owning user; one linked account per user.
        user_id -> Uuid,
        /// Access token issued by the provider.
        access_token -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(account_tokens -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(users, account_tokens);

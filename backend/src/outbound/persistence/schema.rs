//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Lookup attributes shared by shoes and polishes.
    ///
    /// One table holds every attribute kind (brand, colour, finish, and the
    /// shoe classifications); `kind` discriminates and names are unique
    /// within a kind.
    attributes (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Attribute kind discriminator.
        kind -> Varchar,
        /// Display name, unique within the kind (max 64 characters).
        name -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shoes, with optional links into `attributes`.
    shoes (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Public URL of the stored image, when selected.
        image_url -> Nullable<Varchar>,
        /// Brand attribute link.
        brand_id -> Nullable<Uuid>,
        /// Storage location link.
        location_id -> Nullable<Uuid>,
        /// Shoe type link.
        shoe_type_id -> Nullable<Uuid>,
        /// Heel type link.
        heel_type_id -> Nullable<Uuid>,
        /// Dress style link.
        dress_style_id -> Nullable<Uuid>,
        /// Free-form notes.
        notes -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shoe-to-colour join table.
    shoe_colors (shoe_id, color_id) {
        /// Owning shoe.
        shoe_id -> Uuid,
        /// Colour attribute.
        color_id -> Uuid,
    }
}

diesel::table! {
    /// Nail polishes.
    polishes (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Brand attribute link.
        brand_id -> Nullable<Uuid>,
        /// Ordinal rating stored as its grade string (`A+` .. `F`).
        rating -> Nullable<Varchar>,
        /// Product or swatch link.
        link -> Nullable<Varchar>,
        /// Coats needed for full coverage.
        coats -> Nullable<Int2>,
        /// Free-form notes.
        notes -> Nullable<Text>,
        /// Date the polish was last worn.
        last_used -> Nullable<Date>,
        /// Bottles currently on hand.
        bottle_count -> Int4,
        /// Finished bottles kept for reference.
        empty_bottle_count -> Int4,
        /// Tri-state age flag; NULL means unclassified.
        is_old -> Nullable<Bool>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Polish-to-colour join table.
    polish_colors (polish_id, color_id) {
        /// Owning polish.
        polish_id -> Uuid,
        /// Colour attribute.
        color_id -> Uuid,
    }
}

diesel::table! {
    /// Polish-to-finish join table.
    polish_finishes (polish_id, finish_id) {
        /// Owning polish.
        polish_id -> Uuid,
        /// Finish attribute.
        finish_id -> Uuid,
    }
}

diesel::joinable!(shoe_colors -> shoes (shoe_id));
diesel::joinable!(polish_colors -> polishes (polish_id));
diesel::joinable!(polish_finishes -> polishes (polish_id));

diesel::allow_tables_to_appear_in_same_query!(
    attributes,
    shoes,
    shoe_colors,
    polishes,
    polish_colors,
    polish_finishes,
);

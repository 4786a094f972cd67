// Mirrors the read-only company dataset; this service never migrates it.

diesel::table! {
    company (id) {
        id -> Integer,
        cnumber -> Nullable<Text>,
        cname -> Nullable<Text>,
        address_line_1 -> Nullable<Text>,
        address_line_2 -> Nullable<Text>,
        address_locality -> Nullable<Text>,
        address_region -> Nullable<Text>,
        address_country -> Nullable<Text>,
        address_postal_code -> Nullable<Text>,
        siccodes -> Nullable<Text>,
        capital_amount -> Nullable<Double>,
        capital_currency -> Nullable<Text>,
        incorporated -> Nullable<Date>,
    }
}

diesel::table! {
    directors (id) {
        id -> Integer,
        cnumber -> Nullable<Text>,
        name -> Nullable<Text>,
        appointed_on -> Nullable<Date>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(company, directors);

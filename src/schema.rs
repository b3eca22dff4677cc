diesel::table! {
    rule_sets (id) {
        id -> Text,
        name -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    glidepath_rules (id) {
        id -> Text,
        rule_set_id -> Text,
        gt_retire_age -> Integer,
        lt_retire_age -> Integer,
    }
}

diesel::table! {
    asset_classes (id) {
        id -> Text,
        name -> Text,
    }
}

diesel::table! {
    asset_categories (id) {
        id -> Text,
        asset_class_id -> Text,
        name -> Text,
    }
}

diesel::table! {
    class_allocations (id) {
        id -> Text,
        rule_id -> Text,
        asset_class_id -> Text,
        percentage -> Text,
    }
}

diesel::table! {
    category_allocations (id) {
        id -> Text,
        rule_id -> Text,
        asset_category_id -> Text,
        percentage -> Text,
    }
}

diesel::table! {
    account_uploads (id) {
        id -> Text,
        user_id -> Text,
        file_datetime -> Text,
        upload_type -> Text,
        filename -> Text,
        entry_count -> Integer,
        created_at -> Timestamp,
    }
}

diesel::table! {
    account_positions (id) {
        id -> Text,
        upload_id -> Text,
        account_number -> Text,
        account_name -> Text,
        symbol -> Text,
        description -> Text,
        quantity -> Text,
        last_price -> Text,
        last_price_change -> Text,
        current_value -> Text,
        todays_gain_loss_dollar -> Text,
        todays_gain_loss_percent -> Text,
        total_gain_loss_dollar -> Text,
        total_gain_loss_percent -> Text,
        percent_of_account -> Text,
        cost_basis_total -> Text,
        average_cost_basis -> Text,
        position_type -> Text,
    }
}

diesel::table! {
    portfolios (id) {
        id -> Text,
        user_id -> Text,
        name -> Text,
        year_born -> Integer,
        retirement_age -> Integer,
        rule_set_id -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    portfolio_items (id) {
        id -> Text,
        portfolio_id -> Text,
        account_number -> Text,
        symbol -> Text,
    }
}

diesel::table! {
    funds (id) {
        id -> Text,
        ticker -> Text,
        name -> Text,
        category_id -> Nullable<Text>,
        preference -> Integer,
    }
}

diesel::joinable!(glidepath_rules -> rule_sets (rule_set_id));
diesel::joinable!(asset_categories -> asset_classes (asset_class_id));
diesel::joinable!(class_allocations -> glidepath_rules (rule_id));
diesel::joinable!(class_allocations -> asset_classes (asset_class_id));
diesel::joinable!(category_allocations -> glidepath_rules (rule_id));
diesel::joinable!(category_allocations -> asset_categories (asset_category_id));
diesel::joinable!(account_positions -> account_uploads (upload_id));
diesel::joinable!(portfolio_items -> portfolios (portfolio_id));
diesel::joinable!(portfolios -> rule_sets (rule_set_id));
diesel::joinable!(funds -> asset_categories (category_id));

diesel::allow_tables_to_appear_in_same_query!(
    rule_sets,
    glidepath_rules,
    asset_classes,
    asset_categories,
    class_allocations,
    category_allocations,
    account_uploads,
    account_positions,
    portfolios,
    portfolio_items,
    funds,
);

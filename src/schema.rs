// Import diesel table macros
use diesel::allow_tables_to_appear_in_same_query;
use diesel::joinable;
use diesel::table;

// Define user profile table
table! {
    user_profiles (id) {
        id -> Integer,
        user_id -> Varchar,
        display_name -> Varchar,
        is_admin -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

// Public-safe projection of user_profiles (a database view, read-only)
table! {
    user_profiles_public (id) {
        id -> Integer,
        user_id -> Varchar,
        display_name -> Varchar,
        created_at -> Timestamp,
    }
}

// Define photos table
table! {
    photos (id) {
        id -> Integer,
        owner_user_id -> Varchar,
        species_id -> Varchar,
        storage_path -> Varchar,
        thumbnail_path -> Nullable<Varchar>,
        privacy -> Varchar,
        hidden_from_feed -> Bool,
        hidden_from_species_view -> Bool,
        lat -> Nullable<Double>,
        lng -> Nullable<Double>,
        description -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

// Define comments table
table! {
    comments (id) {
        id -> Integer,
        photo_id -> Integer,
        user_id -> Varchar,
        content -> Text,
        created_at -> Timestamp,
    }
}

// Define friendships table
table! {
    friendships (id) {
        id -> Integer,
        requester_user_id -> Varchar,
        addressee_user_id -> Varchar,
        status -> Varchar,
        created_at -> Timestamp,
    }
}

// Define quests table
table! {
    quests (id) {
        id -> Integer,
        name -> Varchar,
        description -> Text,
        start_time -> Timestamp,
        end_time -> Timestamp,
        participation_award_url -> Nullable<Varchar>,
        top10_award_url -> Nullable<Varchar>,
        winner_entry_id -> Nullable<Integer>,
        created_at -> Timestamp,
    }
}

// Define quest entries table (one entry per quest per user)
table! {
    quest_entries (id) {
        id -> Integer,
        quest_id -> Integer,
        user_id -> Varchar,
        photo_id -> Integer,
        created_at -> Timestamp,
    }
}

// Define quest votes table (composite key: one vote per voter per quest)
table! {
    quest_votes (quest_id, voter_user_id) {
        quest_id -> Integer,
        voter_user_id -> Varchar,
        entry_id -> Integer,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

// Define top species mapping (the designated top photo per user/species)
table! {
    top_species (user_id, species_id) {
        user_id -> Varchar,
        species_id -> Varchar,
        photo_id -> Integer,
        updated_at -> Timestamp,
    }
}

joinable!(comments -> photos (photo_id));
joinable!(quest_entries -> quests (quest_id));
joinable!(quest_entries -> photos (photo_id));
joinable!(quest_votes -> quests (quest_id));
joinable!(quest_votes -> quest_entries (entry_id));
joinable!(top_species -> photos (photo_id));

// Allow joining the tables if needed
allow_tables_to_appear_in_same_query!(
    user_profiles,
    user_profiles_public,
    photos,
    comments,
    friendships,
    quests,
    quest_entries,
    quest_votes,
    top_species,
);

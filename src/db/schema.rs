table! {
    articles (id) {
        id -> Uuid,
        title -> Varchar,
        slug -> Varchar,
        status -> crate::db::types::Article_status,
        author -> Int4,
        original_pdf_url -> Varchar,
        original_word_url -> Nullable<Varchar>,
        current_pdf_url -> Varchar,
        current_word_url -> Nullable<Varchar>,
        assigned_editor -> Nullable<Int4>,
        assigned_reviewer -> Nullable<Int4>,
        content -> Nullable<Text>,
        content_html -> Nullable<Text>,
        submitted_at -> Timestamp,
        reviewed_at -> Nullable<Timestamp>,
        editor_approved_at -> Nullable<Timestamp>,
        approved_at -> Nullable<Timestamp>,
    }
}

table! {
    article_revisions (id) {
        id -> Int4,
        article -> Uuid,
        pdf_url -> Varchar,
        word_url -> Nullable<Varchar>,
        uploader -> Int4,
        comments -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

table! {
    article_change_logs (id) {
        id -> Int4,
        article -> Uuid,
        version_number -> Int4,
        old_file_url -> Varchar,
        new_file_url -> Varchar,
        file_type -> crate::db::types::File_type,
        diff_data -> Jsonb,
        status -> crate::db::types::Change_status,
        editor -> Int4,
        edited_at -> Timestamp,
        comments -> Nullable<Text>,
        editor_document_url -> Nullable<Varchar>,
        editor_document_type -> Nullable<crate::db::types::File_type>,
        visual_diff_status -> crate::db::types::Visual_diff_status,
        visual_diff_url -> Nullable<Varchar>,
    }
}

table! {
    audit_log (id) {
        id -> Int4,
        timestamp -> Timestamp,
        actor -> Nullable<Int4>,
        context -> Varchar,
        context_id -> Nullable<Int4>,
        context_uuid -> Nullable<Uuid>,
        kind -> Varchar,
        data -> Bytea,
    }
}

table! {
    events (id) {
        id -> Int4,
        user -> Int4,
        timestamp -> Timestamp,
        kind -> Varchar,
        is_unread -> Bool,
        data -> Bytea,
    }
}

table! {
    users (id) {
        id -> Int4,
        email -> Varchar,
        name -> Varchar,
        permissions -> Int4,
        is_active -> Bool,
    }
}

joinable!(article_revisions -> articles (article));
joinable!(article_revisions -> users (uploader));
joinable!(article_change_logs -> articles (article));
joinable!(article_change_logs -> users (editor));
joinable!(audit_log -> users (actor));
joinable!(events -> users (user));

allow_tables_to_appear_in_same_query!(
    articles,
    article_revisions,
    article_change_logs,
    audit_log,
    events,
    users,
);

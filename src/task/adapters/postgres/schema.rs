//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Workshop tasks, hand-made or generated from inspection defects.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// `manual` or `inspection_defect`.
        #[max_length = 32]
        origin_kind -> Varchar,
        /// Source inspection for defect tasks.
        inspection_id -> Nullable<Uuid>,
        /// Checklist item key for defect tasks.
        #[max_length = 255]
        defect_key -> Nullable<Varchar>,
        /// Target vehicle; exclusive with `plant_id`.
        vehicle_id -> Nullable<Uuid>,
        /// Target plant; exclusive with `vehicle_id`.
        plant_id -> Nullable<Uuid>,
        /// Title.
        title -> Text,
        /// Description.
        description -> Nullable<Text>,
        /// Top-level category.
        category_id -> Nullable<Uuid>,
        /// Subcategory.
        subcategory_id -> Nullable<Uuid>,
        /// Odometer reading.
        mileage -> Nullable<Int8>,
        /// Workflow status.
        #[max_length = 20]
        status -> Varchar,
        /// Structured status history.
        status_history -> Nullable<Jsonb>,
        /// Legacy: when logged.
        logged_at -> Nullable<Timestamptz>,
        /// Legacy: who logged.
        logged_by -> Nullable<Uuid>,
        /// Legacy: logging note.
        logged_comment -> Nullable<Text>,
        /// Legacy: when completed.
        actioned_at -> Nullable<Timestamptz>,
        /// Legacy: who completed.
        actioned_by -> Nullable<Uuid>,
        /// Legacy: completion note.
        actioned_comment -> Nullable<Text>,
        /// Attached checklist form.
        checklist -> Nullable<Jsonb>,
        /// Creator.
        created_by -> Uuid,
        /// Creator display name.
        created_by_name -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments on workshop tasks.
    task_comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Author.
        author_id -> Uuid,
        /// Author display name.
        author_name -> Nullable<Text>,
        /// Body text.
        body -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last edit timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Two-tier task categories.
    categories (id) {
        /// Category identifier.
        id -> Uuid,
        /// Display name.
        name -> Text,
        /// Parent for subcategories.
        parent_id -> Nullable<Uuid>,
        /// Declared completion-update rules.
        completion_updates -> Jsonb,
    }
}

diesel::joinable!(task_comments -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_comments, categories);

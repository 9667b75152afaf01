mod sqlite_async_task_store;

pub use sqlite_async_task_store::SqliteAsyncTaskStore;

//! Integration tests for the entity repository.
//!
//! These tests use the real Repository and SearchIndexService over the
//! in-memory store and provider, wrapped in recorders that log every backend
//! call so write ordering can be checked.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use entity_repository::{
    EntityStore, MemoryEntityStore, ReindexOperation, Repository, RepositoryError, StoreError,
};
use entity_search_repository::{
    MemorySearchProvider, SearchIndexError, SearchIndexProvider, SearchIndexService,
};
use entity_search_shared::{
    Document, DocumentQuery, Entity, FieldAccessors, FieldKind, FieldValue, QueryResults,
    RangePage, RangeRequest, Value,
};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default, PartialEq)]
struct Article {
    id: Option<i64>,
    title: String,
    views: i64,
    author: Author,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Author {
    name: String,
}

impl Article {
    fn new(title: &str, views: i64, author: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            views,
            author: Author {
                name: author.to_string(),
            },
        }
    }
}

static ARTICLE_FIELDS: LazyLock<FieldAccessors<Article>> = LazyLock::new(|| {
    FieldAccessors::new()
        .field_with_setter(
            "title",
            FieldKind::Text,
            |a: &Article| Value::from(&a.title),
            |a: &mut Article, v| a.title = v.to_string(),
        )
        .field_with_setter(
            "views",
            FieldKind::Integer,
            |a: &Article| Value::from(a.views),
            |a: &mut Article, v| a.views = v.as_i64().unwrap_or_default(),
        )
        .field_with_setter(
            "author.name",
            FieldKind::Text,
            |a: &Article| Value::from(&a.author.name),
            |a: &mut Article, v| a.author.name = v.to_string(),
        )
});

impl Entity for Article {
    fn kind() -> &'static str {
        "Article"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn accessors() -> &'static FieldAccessors<Self> {
        &ARTICLE_FIELDS
    }
}

type CallLog = Arc<Mutex<Vec<String>>>;

// Store that records calls before delegating to the in-memory store
struct RecordingStore {
    inner: MemoryEntityStore<Article>,
    calls: CallLog,
    should_fail_save: bool,
}

#[async_trait]
impl EntityStore<Article> for RecordingStore {
    async fn save(&self, entities: &[Article]) -> Result<Vec<i64>, StoreError> {
        self.calls.lock().await.push(format!("store.save:{}", entities.len()));
        if self.should_fail_save {
            return Err(StoreError::backend("Mock save failure"));
        }
        self.inner.save(entities).await
    }

    async fn get(&self, ids: &[i64]) -> Result<HashMap<i64, Article>, StoreError> {
        self.inner.get(ids).await
    }

    async fn delete(&self, ids: &[i64]) -> Result<(), StoreError> {
        self.calls.lock().await.push(format!("store.delete:{}", ids.len()));
        self.inner.delete(ids).await
    }

    async fn filter_by_field(
        &self,
        field: &str,
        values: &[Value],
    ) -> Result<Vec<Article>, StoreError> {
        self.inner.filter_by_field(field, values).await
    }

    async fn limit(&self, count: usize) -> Result<Vec<Article>, StoreError> {
        self.inner.limit(count).await
    }
}

// Provider that records calls before delegating to the in-memory provider
struct RecordingProvider {
    inner: MemorySearchProvider,
    calls: CallLog,
    should_fail_put: bool,
}

#[async_trait]
impl SearchIndexProvider for RecordingProvider {
    async fn ensure_index_exists(&self, index: &str) -> Result<(), SearchIndexError> {
        self.inner.ensure_index_exists(index).await
    }

    async fn put_documents(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<(), SearchIndexError> {
        self.calls.lock().await.push(format!("index.put:{}", documents.len()));
        if self.should_fail_put {
            return Err(SearchIndexError::index("Mock put failure"));
        }
        self.inner.put_documents(index, documents).await
    }

    async fn delete_documents(&self, index: &str, ids: &[String]) -> Result<(), SearchIndexError> {
        self.calls.lock().await.push(format!("index.delete:{}", ids.len()));
        self.inner.delete_documents(index, ids).await
    }

    async fn query(
        &self,
        index: &str,
        query: &DocumentQuery,
    ) -> Result<QueryResults, SearchIndexError> {
        self.inner.query(index, query).await
    }

    async fn get_range(
        &self,
        index: &str,
        request: &RangeRequest,
    ) -> Result<RangePage, SearchIndexError> {
        self.inner.get_range(index, request).await
    }
}

struct Fixture {
    calls: CallLog,
    store: Arc<RecordingStore>,
    provider: Arc<RecordingProvider>,
    repository: Repository<Article>,
}

fn fixture_with(should_fail_save: bool, should_fail_put: bool) -> Fixture {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::new(RecordingStore {
        inner: MemoryEntityStore::new(),
        calls: calls.clone(),
        should_fail_save,
    });
    let provider = Arc::new(RecordingProvider {
        inner: MemorySearchProvider::new(),
        calls: calls.clone(),
        should_fail_put,
    });
    let service = SearchIndexService::new(provider.clone());
    let repository =
        Repository::new(store.clone(), service, ["title", "views", "author.name"]).unwrap();

    Fixture {
        calls,
        store,
        provider,
        repository,
    }
}

fn fixture() -> Fixture {
    fixture_with(false, false)
}

async fn seed(fixture: &Fixture) -> Vec<Article> {
    let saved = fixture
        .repository
        .save_all(vec![
            Article::new("Rust ownership explained", 120, "Ferris"),
            Article::new("Async Rust in practice", 300, "Ferris"),
            Article::new("Gardening for beginners", 45, "Alex"),
        ])
        .await
        .unwrap()
        .complete()
        .await
        .unwrap();
    fixture.calls.lock().await.clear();
    saved
}

#[tokio::test]
async fn test_save_then_load() {
    let fixture = fixture();

    let saved = fixture
        .repository
        .save(Article::new("Hello", 1, "Sam"))
        .await
        .unwrap()
        .complete()
        .await
        .unwrap();

    let id = saved.id.expect("id assigned on save");
    assert_eq!(fixture.repository.load(id).await.unwrap(), Some(saved));

    let document = fixture
        .provider
        .inner
        .document("article", &id.to_string())
        .unwrap();
    assert_eq!(
        document.field("author_name"),
        Some(&FieldValue::Text("Sam".into()))
    );
}

#[tokio::test]
async fn test_store_write_precedes_index_write_for_new_entities() {
    let fixture = fixture();
    let mut existing = Article::new("existing", 0, "Sam");
    existing.id = Some(40);

    let saved = fixture
        .repository
        .save_all(vec![existing, Article::new("new", 0, "Sam")])
        .await
        .unwrap()
        .complete()
        .await
        .unwrap();

    assert_eq!(saved[0].id, Some(40));
    assert_eq!(saved[1].id, Some(41));
    assert_eq!(
        *fixture.calls.lock().await,
        vec!["store.save:2".to_string(), "index.put:2".to_string()]
    );
}

#[tokio::test]
async fn test_store_failure_for_new_entities_skips_index() {
    let fixture = fixture_with(true, false);

    let result = fixture
        .repository
        .save(Article::new("lost", 0, "Sam"))
        .await;

    assert!(matches!(result, Err(RepositoryError::StoreWrite(_))));
    assert_eq!(*fixture.calls.lock().await, vec!["store.save:1".to_string()]);
}

#[tokio::test]
async fn test_index_failure_is_reported_on_complete() {
    let fixture = fixture_with(false, true);

    let pending = fixture
        .repository
        .save(Article::new("unindexed", 0, "Sam"))
        .await
        .unwrap();

    assert!(matches!(
        pending.complete().await,
        Err(RepositoryError::IndexWrite(_))
    ));
    assert_eq!(fixture.store.inner.len().await, 1);
}

#[tokio::test]
async fn test_delete_removes_from_store_and_index() {
    let fixture = fixture();
    let saved = seed(&fixture).await;
    let id = saved[0].id.unwrap();

    fixture.repository.delete(id).complete().await.unwrap();

    assert_eq!(fixture.repository.load(id).await.unwrap(), None);
    let request = fixture.repository.search().unwrap().field("title").is("ownership");
    assert!(fixture
        .repository
        .complete_search(&request)
        .await
        .unwrap()
        .is_empty());

    let mut calls = fixture.calls.lock().await.clone();
    calls.sort();
    assert_eq!(calls, vec!["index.delete:1", "store.delete:1"]);
}

#[tokio::test]
async fn test_complete_search_orders_and_loads_entities() {
    let fixture = fixture();
    let saved = seed(&fixture).await;

    let request = fixture
        .repository
        .search()
        .unwrap()
        .field("author.name")
        .eq("Ferris")
        .order("views")
        .descending();

    let found = fixture.repository.complete_search(&request).await.unwrap();
    assert_eq!(found, vec![saved[1].clone(), saved[0].clone()]);

    let ids = fixture.repository.complete_id_search(&request).await.unwrap();
    assert_eq!(ids, vec![saved[1].id.unwrap(), saved[0].id.unwrap()]);
}

#[tokio::test]
async fn test_search_skips_ids_missing_from_store() {
    let fixture = fixture();
    let saved = seed(&fixture).await;
    fixture
        .store
        .inner
        .delete(&[saved[2].id.unwrap()])
        .await
        .unwrap();

    let request = fixture.repository.search().unwrap().query("gardening");
    assert_eq!(
        fixture.repository.complete_id_search(&request).await.unwrap(),
        vec![saved[2].id.unwrap()]
    );
    assert!(fixture
        .repository
        .complete_search(&request)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_reindex_without_transform_does_not_save() {
    let fixture = fixture();
    let saved = seed(&fixture).await;

    let request = fixture.repository.search().unwrap();
    let count = fixture.repository.reindex(&request, 2, None).await.unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        *fixture.calls.lock().await,
        vec!["index.put:2".to_string(), "index.put:1".to_string()]
    );
    for article in &saved {
        assert_eq!(
            fixture.repository.load(article.id.unwrap()).await.unwrap().as_ref(),
            Some(article)
        );
    }
}

#[tokio::test]
async fn test_reindex_with_transform_saves_returned_entities() {
    let fixture = fixture();
    seed(&fixture).await;

    let promote = |batch: Vec<Article>| -> Vec<Article> {
        batch
            .into_iter()
            .filter(|a| a.author.name == "Ferris")
            .map(|mut a| {
                a.views += 1000;
                a
            })
            .collect()
    };
    let request = fixture.repository.search().unwrap().order("views").ascending();
    let count = fixture
        .repository
        .reindex(&request, 10, Some(&promote as &dyn ReindexOperation<Article>))
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        *fixture.calls.lock().await,
        vec!["store.save:2".to_string(), "index.put:2".to_string()]
    );

    let popular = fixture
        .repository
        .search()
        .unwrap()
        .field("views")
        .greater_than(1000);
    let titles: Vec<String> = fixture
        .repository
        .complete_search(&popular)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.title)
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Async Rust in practice".to_string()));
}

#[tokio::test]
async fn test_repository_without_fields_skips_index() {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::new(RecordingStore {
        inner: MemoryEntityStore::new(),
        calls: calls.clone(),
        should_fail_save: false,
    });
    let provider = Arc::new(RecordingProvider {
        inner: MemorySearchProvider::new(),
        calls: calls.clone(),
        should_fail_put: false,
    });
    let service = SearchIndexService::new(provider);
    let repository = Repository::new(store, service, Vec::<String>::new()).unwrap();

    let saved = repository
        .save(Article::new("quiet", 0, "Sam"))
        .await
        .unwrap()
        .complete()
        .await
        .unwrap();
    repository
        .delete_entity(&saved)
        .complete()
        .await
        .unwrap();

    assert_eq!(
        *calls.lock().await,
        vec!["store.save:1".to_string(), "store.delete:1".to_string()]
    );
    assert!(matches!(
        repository.search(),
        Err(RepositoryError::Configuration(_))
    ));
}

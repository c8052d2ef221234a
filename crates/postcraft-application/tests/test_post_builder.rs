use async_trait::async_trait;
use postcraft_application::{BuilderEvent, PostBuilder};
use postcraft_core::config::GenerationSettings;
use postcraft_core::error::{IMAGE_FAILURE_MESSAGE, POST_FAILURE_MESSAGE, PostcraftError, Result};
use postcraft_core::{
    DataUri, FormField, GenerationService, GenerationState, ImageDecoder, ImageGenerationRequest,
    ImageMode, ImageSource, NoticeLevel, Platform, PostFormat, TextGenerationRequest,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const POST_JSON: &str =
    r#"{"caption":"Sun's out!","imageDescription":"A sunny beach","hashtags":["sun","beach"]}"#;

struct MockGeneration {
    text: Result<String>,
    image: Result<DataUri>,
    text_calls: AtomicUsize,
    image_calls: AtomicUsize,
    last_text: Mutex<Option<TextGenerationRequest>>,
    last_image: Mutex<Option<ImageGenerationRequest>>,
}

impl MockGeneration {
    fn new(text: Result<String>, image: Result<DataUri>) -> Arc<Self> {
        Arc::new(Self {
            text,
            image,
            text_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            last_text: Mutex::new(None),
            last_image: Mutex::new(None),
        })
    }

    fn ok() -> Arc<Self> {
        Self::new(Ok(POST_JSON.to_string()), Ok(generated_image()))
    }
}

#[async_trait]
impl GenerationService for MockGeneration {
    async fn generate_text(&self, request: &TextGenerationRequest) -> Result<String> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(request.clone());
        self.text.clone()
    }

    async fn generate_image(&self, request: &ImageGenerationRequest) -> Result<DataUri> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_image.lock().unwrap() = Some(request.clone());
        self.image.clone()
    }
}

/// Decodes in-memory sources; names ending in `.bad` fail.
#[derive(Default)]
struct MockDecoder {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageDecoder for MockDecoder {
    async fn decode(&self, source: &ImageSource) -> Result<DataUri> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match source {
            ImageSource::Memory { name, .. } if name.ends_with(".bad") => {
                Err(PostcraftError::validation(format!("{name} is not an image")))
            }
            ImageSource::Memory { bytes, .. } => Ok(DataUri::from_bytes("image/png", bytes)),
            ImageSource::File(path) => Err(PostcraftError::io(format!(
                "unexpected file {}",
                path.display()
            ))),
        }
    }
}

/// Takes `delay_ms` from each source's bytes and records completion order.
#[derive(Default)]
struct SlowDecoder {
    finished: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageDecoder for SlowDecoder {
    async fn decode(&self, source: &ImageSource) -> Result<DataUri> {
        let ImageSource::Memory { name, bytes } = source else {
            return Err(PostcraftError::validation("expected an in-memory source"));
        };
        let delay_ms = u64::from(bytes[0]);
        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
        self.finished.lock().unwrap().push(name.clone());
        Ok(DataUri::from_bytes("image/png", name.as_bytes()))
    }
}

fn generated_image() -> DataUri {
    DataUri::from_bytes("image/png", b"generated")
}

fn source(name: &str) -> ImageSource {
    ImageSource::Memory {
        name: name.to_string(),
        bytes: name.as_bytes().to_vec(),
    }
}

fn sources(count: usize) -> Vec<ImageSource> {
    (0..count).map(|i| source(&format!("ref-{i}.png"))).collect()
}

fn builder(generation: Arc<MockGeneration>) -> (PostBuilder, Arc<MockDecoder>) {
    let decoder = Arc::new(MockDecoder::default());
    let builder = PostBuilder::new(generation, decoder.clone(), &GenerationSettings::default());
    (builder, decoder)
}

fn describe(builder: &mut PostBuilder) {
    builder
        .set_field(FormField::Description(
            "A promotional post for our summer collection".to_string(),
        ))
        .unwrap();
}

#[tokio::test]
async fn test_blank_description_never_calls_the_service() {
    let generation = MockGeneration::ok();
    let (mut builder, _) = builder(generation.clone());
    builder
        .set_field(FormField::Description("   \n\t".to_string()))
        .unwrap();

    let err = builder.generate().await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(generation.text_calls.load(Ordering::SeqCst), 0);
    assert_eq!(generation.image_calls.load(Ordering::SeqCst), 0);
    assert_eq!(builder.state(), &GenerationState::Idle);
    assert!(builder.history().is_empty());
}

#[tokio::test]
async fn test_successful_generation() {
    let generation = MockGeneration::ok();
    let (mut builder, _) = builder(generation.clone());
    describe(&mut builder);
    builder
        .set_field(FormField::PostFormat(PostFormat::Story))
        .unwrap();

    let post = builder.generate().await.unwrap();

    assert_eq!(post.caption, "Sun's out!");
    assert_eq!(post.image_description, "A sunny beach");
    assert_eq!(post.hashtags(), ["sun".to_string(), "beach".to_string()]);
    assert_eq!(post.post_format, PostFormat::Story);
    assert_eq!(post.target_dimensions.height, 1920);
    assert_eq!(post.generated_image, Some(generated_image()));
    assert!(post.reference_images.is_none());

    assert_eq!(builder.state(), &GenerationState::Done { post_id: post.id });
    assert_eq!(builder.current().map(|p| p.id), Some(post.id));
    assert_eq!(builder.history().len(), 1);

    let text = generation.last_text.lock().unwrap().clone().unwrap();
    assert_eq!(text.response_schema.name, "post");
    assert!(text.user_instruction.contains("instagram (Story (9:16))"));
    assert!(text.images.is_empty());

    let image = generation.last_image.lock().unwrap().clone().unwrap();
    assert_eq!(image.prompt, "A sunny beach");
    assert_eq!(image.mode, ImageMode::Generate);
    assert_eq!(image.count, 1);
}

#[tokio::test]
async fn test_reference_images_seed_an_edit() {
    let generation = MockGeneration::ok();
    let (mut builder, _) = builder(generation.clone());
    describe(&mut builder);
    assert_eq!(builder.add_reference_images(sources(2)).await, 2);

    let post = builder.generate().await.unwrap();

    assert_eq!(post.reference_images().len(), 2);
    let text = generation.last_text.lock().unwrap().clone().unwrap();
    assert_eq!(text.images.len(), 2);
    let image = generation.last_image.lock().unwrap().clone().unwrap();
    match image.mode {
        ImageMode::Edit { seed_images } => assert_eq!(seed_images, post.reference_images()),
        other => panic!("expected edit mode, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_hashtags_records_nothing() {
    let generation = MockGeneration::new(
        Ok(r#"{"caption":"c","imageDescription":"d"}"#.to_string()),
        Ok(generated_image()),
    );
    let (mut builder, _) = builder(generation.clone());
    let mut events = builder.subscribe();
    describe(&mut builder);

    let err = builder.generate().await.unwrap_err();

    assert!(err.is_response_validation());
    assert!(builder.history().is_empty());
    assert!(builder.current().is_none());
    assert!(matches!(builder.state(), GenerationState::Failed { .. }));
    assert_eq!(generation.image_calls.load(Ordering::SeqCst), 0);

    let mut notices = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let BuilderEvent::Notice(notice) = event {
            notices.push(notice);
        }
    }
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, POST_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_network_failure_is_reported() {
    let generation = MockGeneration::new(
        Err(PostcraftError::network(Some(500), "upstream down")),
        Ok(generated_image()),
    );
    let (mut builder, _) = builder(generation);
    describe(&mut builder);

    let err = builder.generate().await.unwrap_err();

    assert!(err.is_network());
    assert_eq!(err.user_message(), POST_FAILURE_MESSAGE);
    assert!(builder.history().is_empty());
}

#[tokio::test]
async fn test_image_failure_keeps_the_caption() {
    let generation = MockGeneration::new(
        Ok(POST_JSON.to_string()),
        Err(PostcraftError::network(Some(400), "content policy")),
    );
    let (mut builder, _) = builder(generation);
    let mut events = builder.subscribe();
    describe(&mut builder);

    let post = builder.generate().await.unwrap();

    assert!(post.generated_image.is_none());
    assert_eq!(builder.history().len(), 1);
    assert_eq!(builder.history().latest().map(|p| p.id), Some(post.id));
    assert!(matches!(
        builder.state(),
        GenerationState::Partial { post_id, .. } if *post_id == post.id
    ));

    let mut saw_post = false;
    let mut image_notice = None;
    while let Ok(event) = events.try_recv() {
        match event {
            BuilderEvent::PostGenerated(generated) => saw_post = generated.id == post.id,
            BuilderEvent::Notice(notice) => image_notice = Some(notice),
            _ => {}
        }
    }
    assert!(saw_post);
    assert_eq!(
        image_notice.map(|n| n.message),
        Some(IMAGE_FAILURE_MESSAGE.to_string())
    );
}

#[tokio::test]
async fn test_blank_image_description_skips_synthesis() {
    let generation = MockGeneration::new(
        Ok(r#"{"caption":"c","imageDescription":"  ","hashtags":[]}"#.to_string()),
        Ok(generated_image()),
    );
    let (mut builder, _) = builder(generation.clone());
    describe(&mut builder);

    let post = builder.generate().await.unwrap();

    assert!(post.generated_image.is_none());
    assert_eq!(generation.image_calls.load(Ordering::SeqCst), 0);
    assert!(matches!(builder.state(), GenerationState::Partial { .. }));
}

#[tokio::test]
async fn test_hashtags_disabled() {
    let generation = MockGeneration::new(
        Ok(r#"{"caption":"c","imageDescription":"d"}"#.to_string()),
        Ok(generated_image()),
    );
    let (mut builder, _) = builder(generation.clone());
    describe(&mut builder);
    builder.set_field(FormField::WantHashtags(false)).unwrap();

    let post = builder.generate().await.unwrap();

    assert!(post.hashtags.is_none());
    let text = generation.last_text.lock().unwrap().clone().unwrap();
    assert!(text.response_schema.schema["properties"].get("hashtags").is_none());
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let (mut builder, _) = builder(MockGeneration::ok());
    describe(&mut builder);

    let first = builder.generate().await.unwrap();
    let second = builder.generate().await.unwrap();

    assert_ne!(first.id, second.id);
    let ids: Vec<_> = builder.history().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(builder.current().map(|p| p.id), Some(second.id));
}

#[tokio::test]
async fn test_two_phases_can_be_driven_separately() {
    let generation = MockGeneration::ok();
    let (mut builder, _) = builder(generation.clone());
    describe(&mut builder);

    let post_id = builder.generate_text().await.unwrap();
    assert_eq!(builder.state(), &GenerationState::GeneratingImage { post_id });
    assert!(builder.current().unwrap().generated_image.is_none());
    assert_eq!(generation.image_calls.load(Ordering::SeqCst), 0);

    builder.synthesize_image(post_id).await.unwrap();
    assert_eq!(
        builder.current().unwrap().generated_image,
        Some(generated_image())
    );
}

#[tokio::test]
async fn test_upload_respects_remaining_slots() {
    let (mut builder, decoder) = builder(MockGeneration::ok());

    assert_eq!(builder.add_reference_images(sources(1)).await, 1);
    // 4 slots left
    assert_eq!(builder.add_reference_images(sources(3)).await, 3);
    // 1 slot left
    assert_eq!(builder.add_reference_images(sources(3)).await, 1);
    assert_eq!(builder.request().reference_images().len(), 5);
    assert_eq!(builder.add_reference_images(sources(2)).await, 0);

    // Sources over the limit are never decoded.
    assert_eq!(decoder.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_failed_decode_is_skipped() {
    let (mut builder, _) = builder(MockGeneration::ok());
    let mut events = builder.subscribe();

    let appended = builder
        .add_reference_images(vec![source("a.png"), source("b.bad"), source("c.png")])
        .await;

    assert_eq!(appended, 2);
    let events: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert!(events.iter().any(|event| matches!(
        event,
        BuilderEvent::Notice(notice) if notice.message.contains("b.bad")
    )));
    assert!(events.contains(&BuilderEvent::ReferenceImagesChanged { count: 2 }));
}

#[tokio::test]
async fn test_remove_reference_image() {
    let (mut builder, _) = builder(MockGeneration::ok());
    builder.add_reference_images(sources(2)).await;

    assert!(builder.remove_reference_image(7).is_none());
    assert_eq!(builder.request().reference_images().len(), 2);
    assert!(builder.remove_reference_image(0).is_some());
    assert_eq!(builder.request().reference_images().len(), 1);
}

#[tokio::test]
async fn test_platform_change_resets_format() {
    let (mut builder, _) = builder(MockGeneration::ok());
    builder
        .set_field(FormField::PostFormat(PostFormat::Story))
        .unwrap();

    builder
        .set_field(FormField::Platform(Platform::Twitter))
        .unwrap();
    assert_eq!(builder.request().post_format(), PostFormat::Post);
    assert!(Platform::Twitter.supports(builder.request().post_format()));

    let err = builder
        .set_field(FormField::PostFormat(PostFormat::Story))
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(builder.request().platform(), Platform::Twitter);
    assert_eq!(builder.request().post_format(), PostFormat::Post);
}

#[tokio::test]
async fn test_out_of_order_decodes_append_once_in_input_order() {
    let decoder = Arc::new(SlowDecoder::default());
    let mut builder = PostBuilder::new(
        MockGeneration::ok(),
        decoder.clone(),
        &GenerationSettings::default(),
    );
    let mut events = builder.subscribe();

    let slow = |name: &str, delay_ms: u8| ImageSource::Memory {
        name: name.to_string(),
        bytes: vec![delay_ms],
    };
    let appended = builder
        .add_reference_images(vec![slow("a.png", 60), slow("b.png", 5), slow("c.png", 30)])
        .await;

    assert_eq!(appended, 3);
    assert_eq!(*decoder.finished.lock().unwrap(), vec!["b.png", "c.png", "a.png"]);

    let expected: Vec<DataUri> = ["a.png", "b.png", "c.png"]
        .iter()
        .map(|name| DataUri::from_bytes("image/png", name.as_bytes()))
        .collect();
    assert_eq!(builder.request().reference_images(), expected.as_slice());

    let changes: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|event| matches!(event, BuilderEvent::ReferenceImagesChanged { .. }))
        .collect();
    assert_eq!(changes, vec![BuilderEvent::ReferenceImagesChanged { count: 3 }]);
}

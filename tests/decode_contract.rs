//! Purpose: Lock the public decode contract end to end through `advcsv::api`.
//! Exports: Integration tests only (no runtime exports).
//! Role: Exercise header binding, custom conversion, element shapes, and error kinds.
//! Invariants: Columns bind by name; declaration order decides binding order.
//! Invariants: Every failure aborts the whole decode with a typed error kind.

use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt;
use std::num::ParseIntError;

use advcsv::api::{
    DecodeOptions, Decoder, ErrorKind, Parsed, Record, TypeShape, UnmarshalCsv, decode,
    validate_destination,
};

const CSV_STR: &str = r#"標題,內容,更多內容,評價,標籤
"Mark Zuckerberg tries to explain his inaction on Trump posts to outraged staff","Facebook (FB) CEO Mark Zuckerberg sought on Tuesday to ease employee outrage over his inaction on incendiary remarks recently posted by President Donald Trump.","During a company-wide town hall, Zuckerberg struggled to explain his decision-making process as many of his employees","2","facebook,trump"
"Dwayne Johnson makes powerful plea for leadership","Dwayne "The Rock" Johnson posted a video calling out President Donald Trump in the wake of George Floyd's death.","","5","trump"
"#;

#[derive(Clone, Debug, Default, PartialEq)]
struct Tags(Vec<String>);

impl UnmarshalCsv for Tags {
    type Error = Infallible;

    fn unmarshal_csv(&mut self, data: &str) -> Result<(), Self::Error> {
        self.0.extend(data.split(',').map(str::to_string));
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Rating(i32);

impl UnmarshalCsv for Rating {
    type Error = ParseIntError;

    fn unmarshal_csv(&mut self, data: &str) -> Result<(), Self::Error> {
        self.0 = data.parse()?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Article {
    title: String,
    content: String,
    rating: Option<Box<Rating>>,
    tags: Option<Box<Tags>>,
    source: String,
}

advcsv::impl_record!(Article {
    title: text = "標題",
    content: text = "內容",
    rating: custom = "評價",
    tags: custom = "標籤",
    source: text,
});

fn tags(values: &[&str]) -> Option<Box<Tags>> {
    Some(Box::new(Tags(values.iter().map(|v| v.to_string()).collect())))
}

fn expected() -> Vec<Article> {
    vec![
        Article {
            title: "Mark Zuckerberg tries to explain his inaction on Trump posts to outraged staff"
                .to_string(),
            content: "Facebook (FB) CEO Mark Zuckerberg sought on Tuesday to ease employee outrage \
                      over his inaction on incendiary remarks recently posted by President Donald \
                      Trump."
                .to_string(),
            rating: Some(Box::new(Rating(2))),
            tags: tags(&["facebook", "trump"]),
            source: String::new(),
        },
        Article {
            title: "Dwayne Johnson makes powerful plea for leadership".to_string(),
            content: "Dwayne \"The Rock\" Johnson posted a video calling out President Donald \
                      Trump in the wake of George Floyd's death."
                .to_string(),
            rating: Some(Box::new(Rating(5))),
            tags: tags(&["trump"]),
            source: String::new(),
        },
    ]
}

#[test]
fn decodes_corpus_into_values() {
    let mut articles: Vec<Article> = Vec::new();
    decode(CSV_STR.as_bytes(), &mut articles).expect("decode");
    assert_eq!(articles, expected());
}

#[test]
fn decodes_corpus_into_boxed_records() {
    let mut articles: Vec<Box<Article>> = Vec::new();
    decode(CSV_STR.as_bytes(), &mut articles).expect("decode");
    let unboxed: Vec<Article> = articles.into_iter().map(|article| *article).collect();
    assert_eq!(unboxed, expected());
}

#[test]
fn decoding_twice_is_deterministic() {
    let mut first: Vec<Article> = Vec::new();
    let mut second: Vec<Article> = Vec::new();
    decode(CSV_STR.as_bytes(), &mut first).expect("first");
    decode(CSV_STR.as_bytes(), &mut second).expect("second");
    assert_eq!(first, second);
}

#[test]
fn appends_after_existing_elements() {
    let sentinel = Article {
        title: "existing".to_string(),
        ..Article::default()
    };
    let mut articles = vec![sentinel.clone()];
    decode(CSV_STR.as_bytes(), &mut articles).expect("decode");
    assert_eq!(articles.len(), 3);
    assert_eq!(articles[0], sentinel);
}

#[derive(Debug, Default, PartialEq)]
struct Post {
    title: String,
    score: Option<Parsed<i64>>,
}

advcsv::impl_record!(Post {
    title: text = "Title",
    score: custom = "Score",
});

#[test]
fn title_body_score_scenario() {
    let mut posts: Vec<Post> = Vec::new();
    decode("Title,Body,Score\nHello,World,7\n".as_bytes(), &mut posts).expect("decode");
    assert_eq!(
        posts,
        vec![Post {
            title: "Hello".to_string(),
            score: Some(Parsed(7)),
        }]
    );
}

#[test]
fn irregular_quotes_are_tolerated() {
    let mut posts: Vec<Post> = Vec::new();
    decode(
        "Title,Score\nsay \"hi\" now,1\n".as_bytes(),
        &mut posts,
    )
    .expect("decode");
    assert_eq!(posts[0].title, "say \"hi\" now");

    let mut posts: Vec<Post> = Vec::new();
    decode(
        "Title,Score\n\"a \"quoted\" word\",1\n\"tail \"\"ok\"\"\",2\n".as_bytes(),
        &mut posts,
    )
    .expect("decode");
    let titles: Vec<&str> = posts.iter().map(|post| post.title.as_str()).collect();
    assert_eq!(titles, vec!["a \"quoted\" word", "tail \"ok\""]);
}

#[test]
fn conversion_failure_aborts_decode() {
    let mut posts: Vec<Post> = Vec::new();
    let err = decode(
        "Title,Score\nok,1\nbad,not-a-number\nlater,3\n".as_bytes(),
        &mut posts,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    assert_eq!(err.field(), Some("score"));
    assert_eq!(err.text(), Some("not-a-number"));
    assert_eq!(err.line(), Some(3));
    let cause = err.source().expect("cause");
    assert_eq!(cause.to_string(), "invalid digit found in string");
}

#[test]
fn short_row_is_reported_in_strict_and_flexible_modes() {
    let input = "Title,Score\nonly-title\n";

    let mut posts: Vec<Post> = Vec::new();
    let strict = decode(input.as_bytes(), &mut posts).unwrap_err();
    assert_eq!(strict.kind(), ErrorKind::Read);

    let mut posts: Vec<Post> = Vec::new();
    let flexible = Decoder::new(DecodeOptions::new().with_flexible(true))
        .decode(input.as_bytes(), &mut posts)
        .unwrap_err();
    assert_eq!(flexible.kind(), ErrorKind::Read);
    assert_eq!(flexible.column(), Some("Score"));
}

#[test]
fn invalid_utf8_is_a_read_error() {
    let mut input = b"Title,Score\n".to_vec();
    input.extend_from_slice(&[0xff, b',', b'1', b'\n']);
    let mut posts: Vec<Post> = Vec::new();
    let err = decode(input.as_slice(), &mut posts).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Read);
    assert!(err.source().is_some());
}

#[derive(Debug)]
struct Broken;

impl fmt::Display for Broken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("broken stream")
    }
}

impl StdError for Broken {}

struct FailingReader {
    served: bool,
}

impl std::io::Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.served {
            return Err(std::io::Error::other(Broken));
        }
        self.served = true;
        let head = b"Title,Score\n";
        buf[..head.len()].copy_from_slice(head);
        Ok(head.len())
    }
}

#[test]
fn io_failure_mid_stream_is_a_read_error() {
    let mut posts: Vec<Post> = Vec::new();
    let err = decode(FailingReader { served: false }, &mut posts).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Read);
    assert_eq!(err.message(), Some("failed to read input"));
}

#[derive(Debug, Default)]
struct Counted {
    title: String,
    count: u32,
}

advcsv::impl_record!(Counted {
    title: text = "Title",
    count: other(u32) = "Score",
});

#[test]
fn unsupported_field_type_fails_only_when_bound() {
    let mut rows: Vec<Counted> = Vec::new();
    decode("Title\nx\n".as_bytes(), &mut rows).expect("count column absent");
    assert_eq!(rows[0].title, "x");
    assert_eq!(rows[0].count, 0);

    let mut rows: Vec<Counted> = Vec::new();
    let err = decode("Title,Score\nx,1\n".as_bytes(), &mut rows).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    assert_eq!(err.type_name(), Some("u32"));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn plain_sequence_destination_is_unsupported() {
    let shape = <Post as Record>::shape().seq();
    let err = validate_destination(&shape).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    assert_eq!(err.type_name(), Some(shape.to_string().as_str()));
    assert!(validate_destination(&TypeShape::destination::<Post>()).is_ok());
}

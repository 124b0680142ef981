use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lammah::artifact::{Analyzer, TextVectorizer};
use lammah::{ClassifierPipeline, ClassifierSpec, Task, TfidfVectorizer, VectorizerSpec};

const SHORT_TEXT: &str = "الفيلم رائع جدا";
const MEDIUM_TEXT: &str = "أعلن الاتحاد عن موعد المباراة النهائية بعد أن فاز الفريق في نصف النهائي \
     بهدفين نظيفين وسط حضور جماهيري كبير في الملعب";
const LONG_TEXT: &str = "شهدت الأسواق المالية تراجعا ملحوظا في بداية الأسبوع بعد صدور بيانات \
     اقتصادية أضعف من المتوقع، إذ انخفض مؤشر البورصة الرئيسي وتراجعت أسعار النفط.\n\n\
     وقال محللون إن المستثمرين يترقبون قرار البنك المركزي بشأن أسعار الفائدة، \
     في حين تواصل الحكومة مفاوضاتها مع المؤسسات الدولية حول برنامج الإصلاح.\n\n\
     وفي سياق متصل، أكد وزير المالية أن الموازنة الجديدة ستركز على دعم القطاعات \
     الإنتاجية وتحفيز الاستثمار وخلق فرص العمل للشباب في مختلف المحافظات.";

/// A synthetic vocabulary of `size` word terms plus the words of the sample texts
fn vocabulary(size: usize) -> Vec<(String, usize)> {
    let mut terms: Vec<String> = [SHORT_TEXT, MEDIUM_TEXT, LONG_TEXT]
        .iter()
        .flat_map(|text| text.split_whitespace())
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|word| word.chars().count() > 1)
        .collect();
    terms.sort();
    terms.dedup();
    terms.extend((0..size).map(|i| format!("كلمة{}", i)));
    terms.into_iter().enumerate().map(|(i, t)| (t, i)).collect()
}

fn setup_benchmark_pipeline(vocab_size: usize, n_classes: usize) -> ClassifierPipeline {
    let vocab = vocabulary(vocab_size);
    let dim = vocab.len();
    let coef = (0..n_classes)
        .map(|c| (0..dim).map(|j| ((c * 31 + j * 17) % 13) as f64 / 13.0 - 0.5).collect())
        .collect();

    ClassifierPipeline::builder(Task::Article)
        .with_vectorizer_spec(VectorizerSpec::new(vocab))
        .unwrap()
        .with_classifier_spec(ClassifierSpec::Linear {
            classes: (0..n_classes as i64).map(Into::into).collect(),
            coef,
            intercept: vec![0.0; n_classes],
        })
        .unwrap()
        .build()
        .unwrap()
}

fn bench_vectorization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Vectorization");

    // Configure sampling
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let word = TfidfVectorizer::from_spec(VectorizerSpec::new(vocabulary(5_000))).unwrap();
    let mut char_spec = VectorizerSpec::new(vocabulary(5_000));
    char_spec.analyzer = Analyzer::CharWb;
    char_spec.ngram_range = (2, 5);
    let char_wb = TfidfVectorizer::from_spec(char_spec).unwrap();

    for (name, text) in [("short_text", SHORT_TEXT), ("medium_text", MEDIUM_TEXT), ("long_text", LONG_TEXT)] {
        group.bench_function(format!("word_{}", name), |b| b.iter(|| word.transform(&[black_box(text)])));
        group.bench_function(format!("char_wb_{}", name), |b| b.iter(|| char_wb.transform(&[black_box(text)])));
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let pipeline = setup_benchmark_pipeline(5_000, 5);
    group.bench_function("predict_medium", |b| {
        b.iter(|| pipeline.predict(black_box(MEDIUM_TEXT)).unwrap())
    });
    group.bench_function("predict_long", |b| b.iter(|| pipeline.predict(black_box(LONG_TEXT)).unwrap()));

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scaling");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    // Test scaling with vocabulary size
    for &size in &[1_000, 10_000, 50_000] {
        let pipeline = setup_benchmark_pipeline(size, 5);
        group.bench_function(format!("vocabulary_{}", size), |b| {
            b.iter(|| pipeline.predict(black_box(LONG_TEXT)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_vectorization, bench_prediction, bench_scaling);
criterion_main!(benches);

//! Integration tests for partitioned batch runs: CSV in, mock catalog,
//! CSV out, partition outputs combined.

use std::path::PathBuf;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use citematch::batch_io::{concat_outputs, read_matches};
use citematch::{
    ArchiveRetriever, LinearModel, Partition, PipelineConfig, read_citations, run_batch,
    write_matches,
};

/// Classifier that only accepts a perfect title match.
fn title_gated_model() -> LinearModel {
    let mut weights = vec![0.0; 10];
    weights[0] = 1.0;
    LinearModel::from_parts(weights, vec![0.0; 10], 0.0, 100.0).unwrap()
}

/// Mounts a catalog that knows exactly one book.
async fn mount_single_book_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "numFound": 1, "docs": [{"identifier": "eighthland"}] }
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/metadata/eighthland"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {
                "identifier-access": "http://archive.org/details/eighthland",
                "title": "The Eighth Land",
                "creator": "Barthel, Thomas S.",
                "publisher": "University Press of Hawaii",
                "date": "1978",
            }
        })))
        .mount(server)
        .await;
}

fn write_input(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("citations.csv");
    std::fs::write(
        &path,
        "title,last,first,last1,first1,last2,first2,date,publisher,url,citation\n\
         The Eighth Land,Barthel,Thomas S.,,,,,1978,University Press of Hawaii,,ref-1\n\
         ,,,,,,,,,,ref-2\n\
         Some Other Book,,,,,,,1990,,,ref-3\n\
         The Eighth Land,,,,,,,1978,,,ref-4\n",
    )
    .unwrap();
    path
}

#[tokio::test]
async fn test_batch_partitions_cover_table_and_concat_to_one_output() {
    let server = MockServer::start().await;
    mount_single_book_catalog(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir);
    let records = read_citations(&input).unwrap();
    assert_eq!(records.len(), 4);

    let retriever = ArchiveRetriever::with_base_url(None, server.uri()).unwrap();
    let model = title_gated_model();
    let config = PipelineConfig::for_batch();

    let partitions = Partition::split(records.len(), 2);
    assert_eq!(partitions.len(), 2);

    let mut outputs = Vec::new();
    let mut success = 0;
    let mut unusable = 0;
    for (i, partition) in partitions.iter().enumerate() {
        let outcome = run_batch(&retriever, &model, &records, *partition, &config, None)
            .await
            .unwrap();
        success += outcome.tally.success;
        unusable += outcome.tally.unusable;
        assert_eq!(outcome.tally.total(), partition.len());

        let out = dir.path().join(format!("matches_{i}.csv"));
        write_matches(&out, &outcome.matches).unwrap();
        outputs.push(out);
    }

    // Rows 1, 3 and 4 ran the pipeline; row 2 has no title
    assert_eq!(success, 3);
    assert_eq!(unusable, 1);

    let dest = dir.path().join("matches.csv");
    let written = concat_outputs(&outputs, &dest).unwrap();
    let combined = read_matches(&dest).unwrap();
    assert_eq!(combined.len(), written);

    // Only the exact-title citations classified as matches
    assert_eq!(combined.len(), 2);
    assert!(combined.iter().all(|r| r.r#match));
    assert_eq!(combined[0].input_citation, "ref-1");
    assert_eq!(combined[1].input_citation, "ref-4");
    assert_eq!(combined[0].title_ia.as_deref(), Some("the eighth land"));

    // Partitioned output equals one unpartitioned run over the full range
    let full = run_batch(
        &retriever,
        &model,
        &records,
        Partition {
            start: 0,
            end: records.len(),
        },
        &config,
        None,
    )
    .await
    .unwrap();
    assert_eq!(full.matches, combined);
}

#[tokio::test]
async fn test_batch_all_rows_emits_training_row_per_candidate() {
    let server = MockServer::start().await;
    mount_single_book_catalog(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir);
    let records = read_citations(&input).unwrap();

    let retriever = ArchiveRetriever::with_base_url(None, server.uri()).unwrap();
    let model = title_gated_model();
    let config = PipelineConfig::for_batch().with_all_rows(true);

    let outcome = run_batch(
        &retriever,
        &model,
        &records,
        Partition {
            start: 0,
            end: records.len(),
        },
        &config,
        None,
    )
    .await
    .unwrap();

    // One candidate per usable citation, non-matches included
    assert_eq!(outcome.training.len(), 3);
    assert_eq!(outcome.matches.len(), 3);
    let non_match = outcome
        .training
        .iter()
        .find(|r| r.input_citation == "ref-3")
        .unwrap();
    assert!(!non_match.r#match);
    assert!(non_match.title_match.unwrap() < 100.0);
    // Catalog side still recorded for the labeling pass
    assert_eq!(non_match.title_ia.as_deref(), Some("the eighth land"));
}

mod tests_artifact;

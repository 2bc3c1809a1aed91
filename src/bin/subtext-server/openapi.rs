use serde_json::{Value, json};

/// The service's OpenAPI 3.1 document.
///
/// The document is a static literal except for `servers[0].url`, which the
/// handler derives from the inbound request's host.
pub fn document(server_url: &str) -> Value {
    json!({
        "openapi": "3.1.0",
        "info": {
            "title": "YouTube Transcript API",
            "description": "Retrieves transcript data for YouTube videos.",
            "version": "v1.0.0"
        },
        "servers": [
            {
                "url": server_url
            }
        ],
        "paths": {
            "/api/transcript": {
                "get": {
                    "description": "Get transcript for a specific YouTube video",
                    "operationId": "GetYouTubeTranscript",
                    "parameters": [
                        {
                            "name": "url",
                            "in": "query",
                            "description": "The full URL of the YouTube video",
                            "required": true,
                            "schema": {
                                "type": "string"
                            }
                        },
                        {
                            "name": "output",
                            "in": "query",
                            "description": "Output encoding for the transcript",
                            "required": false,
                            "schema": {
                                "type": "string",
                                "enum": ["json", "srt", "text"],
                                "default": "json"
                            }
                        }
                    ],
                    "responses": {
                        "200": {
                            "description": "Successful response",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": {
                                            "type": "object",
                                            "properties": {
                                                "text": {"type": "string"},
                                                "start": {"type": "number"},
                                                "duration": {"type": "number"}
                                            }
                                        }
                                    }
                                },
                                "text/plain": {
                                    "schema": {
                                        "type": "string"
                                    }
                                }
                            }
                        },
                        "400": {
                            "description": "Bad request - Invalid YouTube URL"
                        },
                        "404": {
                            "description": "Transcript not available for this video"
                        },
                        "429": {
                            "description": "Rate limit exceeded"
                        },
                        "500": {
                            "description": "Internal server error"
                        }
                    }
                }
            },
            "/api/hello": {
                "get": {
                    "description": "Liveness greeting",
                    "operationId": "GetHello",
                    "responses": {
                        "200": {
                            "description": "Successful response"
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_url_is_injected() {
        let doc = document("https://transcripts.example.com");
        assert_eq!(doc["servers"][0]["url"], "https://transcripts.example.com");
        assert_eq!(doc["openapi"], "3.1.0");
    }

    #[test]
    fn transcript_path_documents_all_outcomes() {
        let doc = document("https://localhost");
        let responses = &doc["paths"]["/api/transcript"]["get"]["responses"];
        for status in ["200", "400", "404", "429", "500"] {
            assert!(responses.get(status).is_some(), "missing {status}");
        }
    }
}

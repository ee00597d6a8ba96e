mod http_flow_tests;
